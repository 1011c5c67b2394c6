use std::fs;
use std::io;
use std::iter::Peekable;
use std::path::Path;
use std::str::Chars;

use regex::Regex;

use crate::error::{ProfileError, Result};

/// 单条忽略规则
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreRule {
    /// 清理后的模式（不含 `!` 前缀）
    pub pattern: String,

    /// 是否是重新包含规则（`!pattern`）
    pub negated: bool,
}

/// 编译后的规则
#[derive(Debug, Clone)]
struct CompiledRule {
    negated: bool,

    /// 模式的路径段数，父目录只比较同样深度的前缀
    segments: usize,

    regex: Regex,
}

/// `.dockerignore` 规则集合 - 加载后不可变
///
/// 规则按文件中的顺序逐条求值，最后一条匹配的规则决定结果。每条模式都锚定在
/// 上下文根目录：`*.log` 只匹配根目录下的日志文件。
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    rules: Vec<IgnoreRule>,
    compiled: Vec<CompiledRule>,
}

impl IgnoreRules {
    /// 不排除任何内容的空规则集
    pub fn empty() -> Self {
        Self::default()
    }

    /// 从上下文目录加载忽略文件；文件不存在时返回空规则集
    pub fn load(context_dir: &Path, ignore_file: &str) -> Result<Self> {
        let path = context_dir.join(ignore_file);

        let content = match fs::read(&path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("未找到忽略文件: {}", path.display());
                return Ok(Self::empty());
            }
            Err(source) => return Err(ProfileError::IgnoreFile { path, source }),
        };

        let rules = Self::parse(&content)?;
        tracing::info!("从 {} 加载了 {} 条忽略规则", path.display(), rules.len());
        Ok(rules)
    }

    /// 解析忽略文件内容；任何一条模式无效都会导致整体失败
    pub fn parse(content: &str) -> Result<Self> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);

        let mut rules = Vec::new();
        for line in content.lines() {
            // 注释必须从行首开始
            if line.starts_with('#') {
                continue;
            }

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let (negated, raw) = match line.strip_prefix('!') {
                Some(rest) => (true, rest.trim()),
                None => (false, line),
            };

            if raw.is_empty() {
                return Err(ProfileError::IgnorePattern {
                    pattern: line.to_string(),
                    message: "`!` 后缺少模式".to_string(),
                });
            }

            rules.push(IgnoreRule {
                pattern: clean_pattern(raw),
                negated,
            });
        }

        Self::from_rules(rules)
    }

    /// 由有序规则列表构建匹配器
    pub fn from_rules(rules: Vec<IgnoreRule>) -> Result<Self> {
        let compiled = rules
            .iter()
            .map(compile_rule)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { rules, compiled })
    }

    /// 路径（相对上下文根目录，`/` 分隔）是否被排除
    ///
    /// 每条规则先匹配路径本身，不匹配时再匹配与模式段数相同的父目录前缀，
    /// 所以排除 `build` 也就排除了 `build/out.bin`。
    pub fn matches(&self, path: &str) -> bool {
        if self.compiled.is_empty() || path.is_empty() || path == "." {
            return false;
        }

        let parent_dirs: Vec<&str> = match path.rsplit_once('/') {
            Some((parent, _)) => parent.split('/').collect(),
            None => Vec::new(),
        };

        let mut excluded = false;
        for rule in &self.compiled {
            let mut matched = rule.regex.is_match(path);
            if !matched && !parent_dirs.is_empty() && rule.segments <= parent_dirs.len() {
                matched = rule.regex.is_match(&parent_dirs[..rule.segments].join("/"));
            }

            if matched {
                excluded = !rule.negated;
            }
        }

        excluded
    }

    /// 是否包含任何 `!` 重新包含规则
    pub fn has_exceptions(&self) -> bool {
        self.rules.iter().any(|rule| rule.negated)
    }

    /// 是否有重新包含规则指向该目录之下
    pub fn has_exception_under(&self, dir: &str) -> bool {
        let prefix = format!("{}/", dir.trim_end_matches('/'));

        self.rules
            .iter()
            .filter(|rule| rule.negated)
            .any(|rule| format!("{}/", rule.pattern).starts_with(&prefix))
    }

    pub fn rules(&self) -> &[IgnoreRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn compile_rule(rule: &IgnoreRule) -> Result<CompiledRule> {
    let invalid = |message: String| ProfileError::IgnorePattern {
        pattern: rule.pattern.clone(),
        message,
    };

    if rule.pattern.is_empty() {
        return Err(invalid("空模式".to_string()));
    }

    let source = glob_to_regex(&rule.pattern).map_err(|message| invalid(message.to_string()))?;
    let regex = Regex::new(&source).map_err(|err| invalid(err.to_string()))?;

    Ok(CompiledRule {
        negated: rule.negated,
        segments: rule.pattern.split('/').count(),
        regex,
    })
}

/// 把 glob 模式翻译成锚定的正则
///
/// `*` 和 `?` 不跨越 `/`，`**` 匹配任意层目录，`\` 转义下一个字符，
/// `[...]` 字符类用 `^` 取反。其余字符（包括 `{` `}`）都按字面匹配。
fn glob_to_regex(pattern: &str) -> std::result::Result<String, &'static str> {
    let mut regex = String::from("^");
    let mut chars = pattern.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                // `**/` 与 `**` 等价
                if chars.peek() == Some(&'/') {
                    chars.next();
                }
                if chars.peek().is_none() {
                    regex.push_str(".*");
                } else {
                    regex.push_str("(.*/)?");
                }
            }
            '*' => regex.push_str("[^/]*"),
            '?' => regex.push_str("[^/]"),
            '\\' => {
                let escaped = chars.next().ok_or("模式以转义符结尾")?;
                push_literal(&mut regex, escaped);
            }
            '[' => push_class(&mut chars, &mut regex)?,
            other => push_literal(&mut regex, other),
        }
    }

    regex.push('$');
    Ok(regex)
}

/// 翻译 `[` 之后的字符类，至少要有一个字符或范围
fn push_class(chars: &mut Peekable<Chars<'_>>, regex: &mut String) -> std::result::Result<(), &'static str> {
    regex.push('[');
    if chars.peek() == Some(&'^') {
        chars.next();
        regex.push('^');
    }

    let mut ranges = 0;
    loop {
        if ranges > 0 && chars.peek() == Some(&']') {
            chars.next();
            break;
        }

        let low = class_char(chars)?;
        push_literal(regex, low);
        if chars.peek() == Some(&'-') {
            chars.next();
            let high = class_char(chars)?;
            regex.push('-');
            push_literal(regex, high);
        }
        ranges += 1;
    }

    regex.push(']');
    Ok(())
}

fn class_char(chars: &mut Peekable<Chars<'_>>) -> std::result::Result<char, &'static str> {
    match chars.next() {
        None => Err("字符类未闭合"),
        Some('-') | Some(']') => Err("字符类中的 `-` 或 `]` 必须转义"),
        Some('\\') => chars.next().ok_or("字符类未闭合"),
        Some(ch) => Ok(ch),
    }
}

fn push_literal(regex: &mut String, ch: char) {
    let mut buf = [0u8; 4];
    regex.push_str(&regex::escape(ch.encode_utf8(&mut buf)));
}

/// 按词法规则清理模式：合并重复的 `/`，去掉 `.` 段，折叠 `..`，并去掉开头的 `/`
fn clean_pattern(raw: &str) -> String {
    let rooted = raw.starts_with('/');

    let mut parts: Vec<&str> = Vec::new();
    for segment in raw.split('/') {
        match segment {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if rooted => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        return ".".to_string();
    }

    parts.join("/")
}
