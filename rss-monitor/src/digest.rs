use crate::types::{Digest, MonitorError, NormalizedItem, Result};
use handlebars::Handlebars;
use interfaces::RenderedDigest;
use serde::Serialize;
use tracing::debug;

const DIGEST_TEMPLATE_NAME: &str = "digest";

/// Feed title, links and item titles are escaped. The summary is feed-supplied
/// HTML and goes in as-is.
const DIGEST_TEMPLATE: &str = r#"<html>
<head><meta charset="utf-8"></head>
<body>
<h2>New feed entries for <a href="{{feed_url}}">{{feed_title}}</a></h2>
{{#each items}}
<div class="entry">
{{#if image_link}}<img src="{{image_link}}" alt="" style="max-width: 200px;"/><br/>
{{/if}}
{{#if published}}<b>Publication date: {{published}}</b><br/>
{{/if}}
<a href="{{link}}"><h3>{{title}}</h3></a>
{{{summary}}}
<br/>
<a href="{{link}}">Read More</a>
</div>
<br/>
{{/each}}
</body>
</html>
"#;

#[derive(Serialize)]
struct DigestView<'a> {
    feed_title: &'a str,
    feed_url: &'a str,
    items: Vec<ItemView<'a>>,
}

#[derive(Serialize)]
struct ItemView<'a> {
    title: &'a str,
    link: &'a str,
    summary: &'a str,
    image_link: Option<&'a str>,
    published: Option<String>,
}

impl<'a> From<&'a NormalizedItem> for ItemView<'a> {
    fn from(item: &'a NormalizedItem) -> Self {
        Self {
            title: &item.title,
            link: &item.link,
            summary: &item.summary,
            image_link: (!item.image_link.is_empty()).then_some(item.image_link.as_str()),
            published: (!item.is_undated())
                .then(|| item.published_at.format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }
}

/// Renders one HTML email per feed digest.
pub struct DigestRenderer {
    handlebars: Handlebars<'static>,
}

impl DigestRenderer {
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars
            .register_template_string(DIGEST_TEMPLATE_NAME, DIGEST_TEMPLATE)
            .map_err(|e| MonitorError::Template(e.to_string()))?;
        Ok(Self { handlebars })
    }

    pub fn render(&self, digest: &Digest) -> Result<RenderedDigest> {
        let view = DigestView {
            feed_title: &digest.feed_title,
            feed_url: &digest.feed_url,
            items: digest.items.iter().map(ItemView::from).collect(),
        };

        let html_body = self
            .handlebars
            .render(DIGEST_TEMPLATE_NAME, &view)
            .map_err(|e| MonitorError::Template(e.to_string()))?;

        let subject = subject_for(digest);
        debug!("Rendered digest '{}' ({} bytes)", subject, html_body.len());

        Ok(RenderedDigest {
            feed_url: digest.feed_url.clone(),
            subject,
            html_body,
        })
    }
}

pub fn subject_for(digest: &Digest) -> String {
    match digest.items.as_slice() {
        [only] => format!("rssmon: {}: {}", digest.feed_title, only.title),
        items => format!("rssmon: {}: {} new items", digest.feed_title, items.len()),
    }
}
