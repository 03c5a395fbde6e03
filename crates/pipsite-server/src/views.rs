//! Page templates.

use axum::http::StatusCode;
use maud::{html, Markup, PreEscaped, DOCTYPE};
use pipsite_catalog::{DocumentRecord, Project, RenderedDocument, RenderedProject, WhitepaperSection};

const NAV: &[(&str, &str)] = &[
    ("/", "Home"),
    ("/whitepapers", "Whitepaper"),
    ("/pips", "PIPs"),
    ("/rpc", "RPC"),
    ("/projects", "Projects"),
    ("/get-started", "Get started"),
    ("/voting", "Voting"),
    ("/funding-transparency", "Funding"),
    ("/contact", "Contact"),
];

fn layout(site_name: &str, title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " | " (site_name) }
            }
            body {
                header {
                    a.brand href="/" { (site_name) }
                    nav {
                        ul {
                            @for (href, label) in NAV {
                                li { a href=(href) { (label) } }
                            }
                        }
                    }
                }
                main { (content) }
                footer {
                    form.newsletter method="post" action="/newsletter" {
                        label for="newsletter-email" { "Subscribe to updates" }
                        input id="newsletter-email" type="email" name="email" required placeholder="you@example.org";
                        input type="text" name="name" placeholder="First name";
                        button type="submit" { "Subscribe" }
                    }
                }
            }
        }
    }
}

pub fn home(site_name: &str) -> Markup {
    layout(
        site_name,
        "Home",
        html! {
            h1 { (site_name) }
            p { "An open network governed in the open. Every protocol change starts as an improvement proposal." }
            p {
                a href="/pips" { "Browse the improvement proposals" }
                " or read the "
                a href="/whitepapers" { "whitepaper" }
                "."
            }
        },
    )
}

pub fn get_started(site_name: &str) -> Markup {
    layout(
        site_name,
        "Get started",
        html! {
            h1 { "Get started" }
            ol {
                li { "Install a wallet from the " a href="/projects" { "project list" } "." }
                li { "Sync with the network and create an address." }
                li { "Read the " a href="/rpc" { "RPC reference" } " to integrate with a node." }
            }
        },
    )
}

pub fn voting(site_name: &str) -> Markup {
    layout(
        site_name,
        "Voting",
        html! {
            h1 { "Voting" }
            p { "Stake holders vote on accepted proposals. Each proposal lists its current status on its " a href="/pips" { "PIP page" } "." }
        },
    )
}

pub fn funding_transparency(site_name: &str) -> Markup {
    layout(
        site_name,
        "Funding transparency",
        html! {
            h1 { "Funding transparency" }
            p { "Grants and treasury spending are published alongside the proposals that authorised them." }
        },
    )
}

pub fn contact(site_name: &str) -> Markup {
    layout(
        site_name,
        "Contact",
        html! {
            h1 { "Contact us" }
            form.contact method="post" action="/contact" {
                label { "Name" input type="text" name="name" maxlength="255" required; }
                label { "Email" input type="email" name="email" required; }
                label { "Phone" input type="tel" name="phone"; }
                label { "Message" textarea name="message" required {} }
                button type="submit" { "Send" }
            }
        },
    )
}

pub fn whitepapers(site_name: &str, sections: &[WhitepaperSection]) -> Markup {
    layout(
        site_name,
        "Whitepaper",
        html! {
            h1 { "Whitepaper" }
            @if sections.is_empty() {
                p.empty { "The whitepaper has not been published yet." }
            }
            @for section in sections {
                section.whitepaper-section {
                    h2 {
                        @if !section.icon.is_empty() {
                            i class=(section.icon) {}
                            " "
                        }
                        (section.title)
                    }
                    (PreEscaped(&section.html))
                }
            }
        },
    )
}

pub fn projects(site_name: &str, projects: &[Project]) -> Markup {
    layout(
        site_name,
        "Projects",
        html! {
            h1 { "Projects" }
            ul.projects {
                @for project in projects {
                    li { a href={ "/projects/" (project.id) } { (project.title) } }
                }
            }
        },
    )
}

pub fn project(site_name: &str, rendered: &RenderedProject) -> Markup {
    layout(
        site_name,
        &rendered.project.title,
        html! {
            article.project {
                h1 { (rendered.project.title) }
                (PreEscaped(&rendered.html))
            }
            p { a href="/projects" { "All projects" } }
        },
    )
}

pub fn pips(site_name: &str, records: &[DocumentRecord]) -> Markup {
    layout(
        site_name,
        "Improvement proposals",
        html! {
            h1 { "Improvement proposals" }
            table.pips {
                thead {
                    tr { th { "Number" } th { "Title" } th { "Author" } th { "Status" } }
                }
                tbody {
                    @for record in records {
                        tr {
                            td { (record.number) }
                            td { a href={ "/pips/" (record.number) } { (record.title) } }
                            td { (record.author.as_deref().unwrap_or("")) }
                            td { (record.status.as_deref().unwrap_or("")) }
                        }
                    }
                }
            }
        },
    )
}

pub fn pip(site_name: &str, document: &RenderedDocument) -> Markup {
    let record = &document.metadata;
    let fields = [
        ("Author", record.author.as_deref()),
        ("Type", record.kind.as_deref()),
        ("Status", record.status.as_deref()),
        ("Created", record.created.as_deref()),
    ];
    layout(
        site_name,
        &format!("PIP-{}: {}", record.number, record.title),
        html! {
            article.pip {
                h1 { "PIP-" (record.number) ": " (record.title) }
                dl.pip-meta {
                    @for (label, value) in fields {
                        @if let Some(value) = value {
                            dt { (label) }
                            dd { (value) }
                        }
                    }
                }
                (PreEscaped(&document.html))
            }
        },
    )
}

pub fn rpc(site_name: &str, html: &str) -> Markup {
    layout(
        site_name,
        "RPC reference",
        html! {
            article.rpc { (PreEscaped(html)) }
        },
    )
}

/// Standalone error page; it does not depend on any site content.
pub fn error_page(status: StatusCode) -> Markup {
    let reason = status.canonical_reason().unwrap_or("Error");
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { (status.as_u16()) " " (reason) }
            }
            body {
                h1 { (status.as_u16()) " " (reason) }
                @if status == StatusCode::NOT_FOUND {
                    p { "The page you asked for does not exist." }
                } @else {
                    p { "Something went wrong on our side." }
                }
                p { a href="/" { "Back to the home page" } }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markup_is_escaped_but_rendered_html_is_not() {
        let document = RenderedDocument {
            metadata: DocumentRecord {
                number: 3,
                slug: "pip-3".into(),
                title: "<Fees>".into(),
                author: None,
                kind: None,
                status: Some("Draft".into()),
                created: None,
            },
            html: "<p>body</p>".into(),
        };
        let page = pip("Site", &document).into_string();
        assert!(page.contains("PIP-3: &lt;Fees&gt;"));
        assert!(page.contains("<p>body</p>"));
        assert!(page.contains("<dt>Status</dt><dd>Draft</dd>"));
        assert!(!page.contains("<dt>Author</dt>"));
    }

    #[test]
    fn error_page_names_status() {
        let page = error_page(StatusCode::NOT_FOUND).into_string();
        assert!(page.contains("404 Not Found"));
    }
}
