//! 发布请求
//!
//! 由命令行参数构造，在启动浏览器之前完成校验，之后按值交给发布流程。

use std::path::PathBuf;

use crate::error::{AppError, AppResult, InputError};

/// 标题最大字符数
pub const MAX_TITLE_CHARS: usize = 20;
/// 正文最大字符数
pub const MAX_CONTENT_CHARS: usize = 1000;

/// 一次发布的全部输入
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishRequest {
    /// 图片路径，至少一张
    pub images: Vec<PathBuf>,
    /// 标题（可选）
    pub title: Option<String>,
    /// 正文（可选）
    pub content: Option<String>,
    /// 话题标签，按输入顺序去重
    pub tags: Vec<String>,
    /// 只填写不发布
    pub dry_run: bool,
}

impl PublishRequest {
    pub fn new(images: Vec<PathBuf>) -> Self {
        Self {
            images,
            ..Default::default()
        }
    }

    /// 设置标题，空字符串视为未设置
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = non_empty(title.into());
        self
    }

    /// 设置正文，空字符串视为未设置
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = non_empty(content.into());
        self
    }

    /// 从逗号分隔的字符串设置标签
    pub fn with_tags_csv(mut self, csv: &str) -> Self {
        self.tags = parse_tags(csv);
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// 校验输入
    ///
    /// 任何失败都属于用户输入错误，调用方应在启动浏览器之前调用。
    pub fn validate(&self) -> AppResult<()> {
        if self.images.is_empty() {
            return Err(InputError::NoImages.into());
        }

        for image in &self.images {
            if !image.is_file() {
                return Err(InputError::ImageNotFound {
                    path: image.display().to_string(),
                }
                .into());
            }
        }

        if let Some(title) = &self.title {
            let len = title.chars().count();
            if len > MAX_TITLE_CHARS {
                return Err(InputError::TitleTooLong {
                    len,
                    max: MAX_TITLE_CHARS,
                }
                .into());
            }
        }

        if let Some(content) = &self.content {
            let len = content.chars().count();
            if len > MAX_CONTENT_CHARS {
                return Err(InputError::ContentTooLong {
                    len,
                    max: MAX_CONTENT_CHARS,
                }
                .into());
            }
        }

        Ok(())
    }

    /// 图片的绝对路径，供文件选择框一次性提交
    pub fn absolute_images(&self) -> AppResult<Vec<PathBuf>> {
        self.images
            .iter()
            .map(|image| {
                std::fs::canonicalize(image).map_err(|_| {
                    AppError::from(InputError::ImageNotFound {
                        path: image.display().to_string(),
                    })
                })
            })
            .collect()
    }
}

/// 解析逗号分隔的标签
///
/// 去掉首尾空白和开头的 `#`，丢弃空项，按首次出现的顺序去重。
pub fn parse_tags(csv: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for raw in csv.split(',') {
        let tag = raw.trim().trim_start_matches('#').trim();
        if tag.is_empty() || tags.iter().any(|t| t == tag) {
            continue;
        }
        tags.push(tag.to_string());
    }
    tags
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
