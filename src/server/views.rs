//! 服务端渲染的页面
//!
//! 模板在启动时注册一次，`{{...}}` 中的值由 handlebars 负责 HTML 转义

use anyhow::{Context, Result};
use axum::response::Html;
use handlebars::Handlebars;
use serde::Serialize;
use serde_json::json;

use crate::clarifai::Hit;
use crate::db::UploadedImageRecord;

const LAYOUT: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{{title}}</title>
<style>
body { font-family: sans-serif; max-width: 960px; margin: 2em auto; }
.grid { display: flex; flex-wrap: wrap; gap: 1em; }
.card { width: 200px; }
.card img { width: 200px; height: 200px; object-fit: cover; }
</style>
</head>
<body>
{{{body}}}
</body>
</html>
"#;

const HOME: &str = r#"<h1>Visual Product Matcher</h1>
<h2>Upload an image</h2>
<form action="/upload" method="post" enctype="multipart/form-data">
  <input type="file" name="image" accept="image/*" required>
  <button type="submit">Upload</button>
</form>
<h2>Find similar products</h2>
<form action="/search-similar" method="post" enctype="multipart/form-data">
  <input type="file" name="image" accept="image/*" required>
  <button type="submit">Search</button>
</form>
<p><a href="/admin">Admin</a></p>"#;

const ADMIN: &str = r#"<h1>Add catalog image</h1>
<form action="/admin" method="post" enctype="multipart/form-data">
  <p><input type="file" name="image" accept="image/*" required></p>
  <p><input type="text" name="name" placeholder="Name"></p>
  <p><input type="text" name="category" placeholder="Category"></p>
  <button type="submit">Upload</button>
</form>
<p><a href="/">Home</a></p>"#;

const RESULT: &str = r#"<h1>Uploaded image</h1>
{{#each images}}
<p><img src="{{image_url}}" alt="uploaded image" width="300"></p>
{{else}}
<p>No image uploaded yet.</p>
{{/each}}
<p><a href="/">Home</a></p>"#;

const RESULTS: &str = r#"<h1>Similar products</h1>
{{#if hits}}
<div class="grid">
{{#each hits}}
<div class="card" data-ref="{{reference}}"><img src="{{image_url}}" alt="{{name}}"><p><b>{{name}}</b> {{category}}</p><p>score: {{score}}</p></div>
{{/each}}
</div>
{{else}}
<p>No similar products found.</p>
{{/if}}
<p><a href="/">Search again</a></p>"#;

/// 搜索结果卡片
#[derive(Serialize)]
struct HitCard<'a> {
    reference: &'a str,
    image_url: &'a str,
    name: &'a str,
    category: &'a str,
    score: String,
}

impl<'a> From<&'a Hit> for HitCard<'a> {
    fn from(hit: &'a Hit) -> Self {
        Self {
            reference: hit.reference(),
            image_url: hit.image_url().unwrap_or_default(),
            name: hit.name().unwrap_or_default(),
            category: hit.category().unwrap_or_default(),
            score: format!("{:.3}", hit.score),
        }
    }
}

/// 页面模板
pub struct Views {
    handlebars: Handlebars<'static>,
}

impl Views {
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();
        for (name, template) in
            [("layout", LAYOUT), ("home", HOME), ("admin", ADMIN), ("result", RESULT), ("results", RESULTS)]
        {
            handlebars
                .register_template_string(name, template)
                .with_context(|| format!("无法注册模板 {name}"))?;
        }
        Ok(Self { handlebars })
    }

    fn render<T: Serialize>(&self, title: &str, template: &str, data: &T) -> Result<Html<String>> {
        let body = self
            .handlebars
            .render(template, data)
            .with_context(|| format!("渲染模板 {template} 失败"))?;
        let html = self
            .handlebars
            .render("layout", &json!({ "title": title, "body": body }))
            .context("渲染页面布局失败")?;
        Ok(Html(html))
    }

    pub fn home(&self) -> Result<Html<String>> {
        self.render("Visual Product Matcher", "home", &json!({}))
    }

    pub fn admin(&self) -> Result<Html<String>> {
        self.render("Admin", "admin", &json!({}))
    }

    /// 最近一次上传的图片
    pub fn result(&self, images: &[UploadedImageRecord]) -> Result<Html<String>> {
        self.render("Result", "result", &json!({ "images": images }))
    }

    /// 相似图片搜索结果
    pub fn results(&self, hits: &[Hit]) -> Result<Html<String>> {
        let hits: Vec<HitCard> = hits.iter().map(HitCard::from).collect();
        self.render("Results", "results", &json!({ "hits": hits }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clarifai::{ImageData, Input, InputData, Metadata};

    #[test]
    fn result_escapes_url() {
        let views = Views::new().unwrap();
        let images = vec![UploadedImageRecord { id: 1, image_url: "/uploads/1-\"x\".jpg".into() }];
        let Html(html) = views.result(&images).unwrap();
        assert!(html.contains("/uploads/1-&quot;x&quot;.jpg"));
        assert!(!html.contains("No image uploaded yet"));

        let Html(html) = views.result(&[]).unwrap();
        assert!(html.contains("No image uploaded yet"));
    }

    #[test]
    fn results_escape_remote_metadata() {
        let views = Views::new().unwrap();
        let hit = Hit {
            score: 0.91234,
            input: Input {
                id: "ref\"1".into(),
                data: InputData {
                    image: Some(ImageData { url: "https://img/a.jpg\"><script>".into() }),
                    metadata: Some(Metadata {
                        name: Some("<script>alert(1)</script>".into()),
                        category: Some("Chairs & Sofas".into()),
                    }),
                },
            },
        };

        let Html(html) = views.results(&[hit]).unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains("Chairs &amp; Sofas"));
        assert!(html.contains("data-ref=\"ref&quot;1\""));
        assert!(html.contains("score: 0.912"));
        assert!(!html.contains("No similar products found"));

        let Html(html) = views.results(&[]).unwrap();
        assert!(html.contains("No similar products found"));
    }
}
