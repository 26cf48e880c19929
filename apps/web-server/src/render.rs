//! Presentation seam.
//!
//! Real template work belongs to an external collaborator; handlers only
//! depend on the `PageRenderer` trait. The built-in renderer emits plain,
//! deterministic HTML - determinism matters because the home page is
//! cached and compared byte-for-byte.

use quill_shared::view::{Listing, Nav, Page, PostView};

/// Turns an assembled page context into an HTML document.
pub trait PageRenderer: Send + Sync {
    fn render(&self, nav: &Nav, page: &Page) -> String;
}

/// Minimal built-in HTML renderer.
pub struct HtmlRenderer;

fn esc(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn push_post(out: &mut String, post: &PostView) {
    out.push_str("<article class=\"post\">");
    if !post.title.is_empty() {
        out.push_str(&format!(
            "<h2><a href=\"/posts/{}/\">{}</a></h2>",
            post.id,
            esc(&post.title)
        ));
    } else {
        out.push_str(&format!(
            "<h2><a href=\"/posts/{}/\">Post {}</a></h2>",
            post.id, post.id
        ));
    }
    out.push_str(&format!(
        "<p class=\"meta\"><a href=\"/profile/{}/\">{}</a> on {}</p>",
        esc(&post.author_username),
        esc(&post.author_name),
        esc(&post.pub_date)
    ));
    if let Some(group) = &post.group {
        out.push_str(&format!(
            "<p class=\"group\"><a href=\"/group/{}/\">{}</a></p>",
            esc(&group.slug),
            esc(&group.title)
        ));
    }
    if let Some(image) = &post.image {
        out.push_str(&format!("<img src=\"/media/{}\" alt=\"\">", esc(image)));
    }
    out.push_str(&format!("<p>{}</p>", esc(&post.text)));
    out.push_str("</article>");
}

fn push_listing(out: &mut String, listing: &Listing) {
    for post in &listing.posts {
        push_post(out, post);
    }
    let w = &listing.window;
    out.push_str("<nav class=\"pagination\">");
    if w.has_previous {
        out.push_str(&format!("<a href=\"?page={}\">previous</a> ", w.page - 1));
    }
    out.push_str(&format!("Page {} of {}", w.page, w.pages));
    if w.has_next {
        out.push_str(&format!(" <a href=\"?page={}\">next</a>", w.page + 1));
    }
    out.push_str("</nav>");
}

impl HtmlRenderer {
    fn body(&self, page: &Page) -> (String, String) {
        let mut out = String::new();
        let title;
        match page {
            Page::Home {
                page_name,
                listing,
                image_strip,
            } => {
                title = page_name.clone();
                if !image_strip.is_empty() {
                    out.push_str("<section class=\"strip\">");
                    for post in image_strip {
                        out.push_str(&format!(
                            "<a href=\"/posts/{}/\"><img src=\"/media/{}\" alt=\"\"></a>",
                            post.id,
                            esc(post.image.as_deref().unwrap_or_default())
                        ));
                    }
                    out.push_str("</section>");
                }
                push_listing(&mut out, listing);
            }
            Page::GroupPosts {
                title: group_title,
                description,
                listing,
                ..
            } => {
                title = group_title.clone();
                out.push_str(&format!("<p>{}</p>", esc(description)));
                push_listing(&mut out, listing);
            }
            Page::Profile {
                author,
                following,
                listing,
            } => {
                title = format!("Posts by {}", author.username);
                let action = if *following { "unfollow" } else { "follow" };
                out.push_str(&format!(
                    "<p><a href=\"/profile/{}/{}/\">{}</a></p>",
                    esc(&author.username),
                    action,
                    action
                ));
                push_listing(&mut out, listing);
            }
            Page::PostDetail { post, comments } => {
                title = if post.title.is_empty() {
                    format!("Post {}", post.id)
                } else {
                    post.title.clone()
                };
                push_post(&mut out, post);
                out.push_str(&format!(
                    "<form method=\"post\" action=\"/posts/{}/comment/\">\
                     <textarea name=\"text\"></textarea>\
                     <button type=\"submit\">Comment</button></form>",
                    post.id
                ));
                out.push_str("<section class=\"comments\">");
                for comment in comments {
                    out.push_str(&format!(
                        "<div class=\"comment\"><b>{}</b> {}<p>{}</p></div>",
                        esc(&comment.author_username),
                        esc(&comment.created),
                        esc(&comment.text)
                    ));
                }
                out.push_str("</section>");
            }
            Page::PostForm { form, editing } => {
                title = match editing {
                    Some(_) => "Edit post".to_string(),
                    None => "New post".to_string(),
                };
                let action = match editing {
                    Some(id) => format!("/posts/{id}/edit/"),
                    None => "/create/".to_string(),
                };
                for error in &form.errors {
                    out.push_str(&format!(
                        "<p class=\"error\" data-field=\"{}\">{}</p>",
                        error.field,
                        esc(&error.message)
                    ));
                }
                out.push_str(&format!(
                    "<form method=\"post\" action=\"{action}\" enctype=\"multipart/form-data\">\
                     <input name=\"title\" value=\"{}\">\
                     <textarea name=\"text\">{}</textarea>\
                     <input name=\"group\" value=\"{}\">\
                     <input type=\"file\" name=\"image\">\
                     <button type=\"submit\">Save</button></form>",
                    esc(&form.title),
                    esc(&form.text),
                    form.group_id.map(|id| id.to_string()).unwrap_or_default()
                ));
            }
            Page::Feed { page_name, listing } => {
                title = page_name.clone();
                push_listing(&mut out, listing);
            }
            Page::Groups { groups } => {
                title = "Groups".to_string();
                out.push_str("<ul>");
                for group in groups {
                    out.push_str(&format!(
                        "<li><a href=\"/group/{}/\">{}</a> {}</li>",
                        esc(&group.slug),
                        esc(&group.title),
                        esc(&group.description)
                    ));
                }
                out.push_str("</ul>");
            }
            Page::Authors { authors } => {
                title = "Authors".to_string();
                out.push_str("<ul>");
                for author in authors {
                    out.push_str(&format!(
                        "<li><a href=\"/profile/{}/\">{}</a></li>",
                        esc(&author.username),
                        esc(&author.full_name)
                    ));
                }
                out.push_str("</ul>");
            }
            Page::Login { next } => {
                title = "Log in".to_string();
                out.push_str("<p>Sign in through your identity provider.</p>");
                if let Some(next) = next {
                    out.push_str(&format!(
                        "<p>You will be returned to {}</p>",
                        esc(next)
                    ));
                }
            }
        }
        (title, out)
    }
}

impl PageRenderer for HtmlRenderer {
    fn render(&self, nav: &Nav, page: &Page) -> String {
        let (title, body) = self.body(page);

        let mut menu = String::new();
        menu.push_str("<nav class=\"menu\"><a href=\"/\">Home</a>");
        for group in &nav.groups {
            menu.push_str(&format!(
                " <a href=\"/group/{}/\">{}</a>",
                esc(&group.slug),
                esc(&group.title)
            ));
        }
        for author in &nav.authors {
            menu.push_str(&format!(
                " <a href=\"/profile/{}/\">{}</a>",
                esc(&author.username),
                esc(&author.username)
            ));
        }
        menu.push_str("</nav>");

        format!(
            "<!DOCTYPE html><html><head><meta charset=\"utf-8\">\
             <title>{}</title></head><body>{}<main><h1>{}</h1>{}</main></body></html>",
            esc(&title),
            menu,
            esc(&title),
            body
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_shared::view::{PageWindow, PostFormState};

    fn empty_listing() -> Listing {
        Listing {
            window: PageWindow {
                page: 1,
                pages: 1,
                total: 0,
                has_previous: false,
                has_next: false,
            },
            posts: Vec::new(),
        }
    }

    #[test]
    fn escapes_user_content() {
        let nav = Nav::default();
        let page = Page::PostForm {
            form: PostFormState {
                title: "<script>".to_string(),
                ..Default::default()
            },
            editing: None,
        };

        let html = HtmlRenderer.render(&nav, &page);

        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let nav = Nav::default();
        let page = Page::Home {
            page_name: "Latest updates".to_string(),
            listing: empty_listing(),
            image_strip: Vec::new(),
        };

        let first = HtmlRenderer.render(&nav, &page);
        let second = HtmlRenderer.render(&nav, &page);

        assert_eq!(first, second);
    }
}
