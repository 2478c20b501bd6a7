//! 搜索结果渲染 - 业务能力层
//!
//! 把 [`SearchResponse`] 渲染成终端文本。输出格式是对外约定，改动需谨慎。

use std::fmt::Write;

use crate::models::{SearchKind, SearchResponse};

/// 按搜索类型渲染结果，序号从 1 开始，保持上游顺序
pub fn render(kind: SearchKind, response: &SearchResponse) -> String {
    let mut out = String::new();
    match kind {
        SearchKind::Search => render_organic(&mut out, response),
        SearchKind::Images => render_images(&mut out, response),
        SearchKind::News => render_news(&mut out, response),
        SearchKind::Videos => render_videos(&mut out, response),
    }
    out
}

fn text(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

// 写入 String 不会失败，忽略 fmt::Result

fn render_organic(out: &mut String, response: &SearchResponse) {
    if response.organic.is_empty() {
        out.push_str("No results found.\n");
        return;
    }
    let _ = writeln!(out, "\n{} results:\n", response.organic.len());
    for (i, r) in response.organic.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, text(&r.title));
        let _ = writeln!(out, "   {}", text(&r.link));
        if let Some(snippet) = r.snippet.as_deref().filter(|s| !s.is_empty()) {
            let _ = writeln!(out, "   {}", snippet);
        }
        out.push('\n');
    }
}

fn render_images(out: &mut String, response: &SearchResponse) {
    if response.images.is_empty() {
        out.push_str("No images found.\n");
        return;
    }
    let _ = writeln!(out, "\n{} images:\n", response.images.len());
    for (i, r) in response.images.iter().enumerate() {
        let title = r.title.as_deref().filter(|t| !t.is_empty()).unwrap_or("Untitled");
        let _ = writeln!(out, "{}. {}", i + 1, title);
        let _ = writeln!(out, "   Image: {}", text(&r.image_url));
        let _ = writeln!(out, "   Source: {}", text(&r.link));
        out.push('\n');
    }
}

fn render_news(out: &mut String, response: &SearchResponse) {
    if response.news.is_empty() {
        out.push_str("No news found.\n");
        return;
    }
    let _ = writeln!(out, "\n{} news:\n", response.news.len());
    for (i, r) in response.news.iter().enumerate() {
        let source = r.source.as_deref().filter(|s| !s.is_empty()).unwrap_or("Unknown");
        let _ = writeln!(out, "{}. {}", i + 1, text(&r.title));
        let _ = writeln!(out, "   {} | {}", source, text(&r.date));
        let _ = writeln!(out, "   {}", text(&r.link));
        out.push('\n');
    }
}

fn render_videos(out: &mut String, response: &SearchResponse) {
    if response.videos.is_empty() {
        out.push_str("No videos found.\n");
        return;
    }
    let _ = writeln!(out, "\n{} videos:\n", response.videos.len());
    for (i, r) in response.videos.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, text(&r.title));
        let _ = writeln!(out, "   {}", text(&r.link));
        if let Some(channel) = r.channel.as_deref().filter(|c| !c.is_empty()) {
            let _ = writeln!(out, "   Channel: {}", channel);
        }
        out.push('\n');
    }
}
