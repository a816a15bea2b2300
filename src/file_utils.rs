use anyhow::{Context, Result, anyhow};
use regex::Regex;
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Find regular files matching a glob pattern, sorted by path.
    ///
    /// Supports `*` and `?` within one path component, `**` across components
    /// and `[...]` character classes (`[!...]` negates).
    pub fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>> {
        let (base, remainder) = split_glob_base(pattern);

        // A pattern without wildcards names a single file
        if remainder.is_empty() {
            return Ok(if Self::file_exists(&base) { vec![base] } else { Vec::new() });
        }

        let matcher = GlobPattern::new(&remainder)?;
        let walk_root = if base.as_os_str().is_empty() { PathBuf::from(".") } else { base.clone() };

        let mut walker = WalkDir::new(&walk_root).follow_links(true);
        if !remainder.contains("**") {
            walker = walker.max_depth(remainder.split('/').count());
        }

        let mut result = Vec::new();
        for entry in walker.into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&walk_root) else {
                continue;
            };
            let relative = relative.to_string_lossy().replace('\\', "/");
            if matcher.is_match(&relative) {
                result.push(base.join(relative));
            }
        }

        result.sort();
        Ok(result)
    }
}

// Splits a glob into the directory prefix without wildcards and the wildcard remainder
fn split_glob_base(pattern: &str) -> (PathBuf, String) {
    let is_wild = |part: &str| part.contains(['*', '?', '[']);
    let parts: Vec<&str> = pattern.split('/').collect();
    let first_wild = parts.iter().position(|part| is_wild(part));

    match first_wild {
        None => (PathBuf::from(pattern), String::new()),
        Some(index) => {
            let base = parts[..index].join("/");
            let base = if base.is_empty() && pattern.starts_with('/') {
                PathBuf::from("/")
            } else {
                PathBuf::from(base)
            };
            (base, parts[index..].join("/"))
        }
    }
}

/// A glob pattern matched one `/`-separated path component at a time.
///
/// Names starting with `.` only match a pattern component that starts with `.`
/// as well; `**` never descends into such names.
#[derive(Debug, Clone)]
pub struct GlobPattern {
    components: Vec<GlobComponent>,
}

#[derive(Debug, Clone)]
enum GlobComponent {
    // `**`: zero or more components
    AnyDepth,
    Name { regex: Regex, allows_hidden: bool },
}

impl GlobPattern {
    pub fn new(pattern: &str) -> Result<Self> {
        let components = pattern
            .split('/')
            .filter(|component| !component.is_empty())
            .map(|component| match component {
                "**" => Ok(GlobComponent::AnyDepth),
                _ => Ok(GlobComponent::Name {
                    regex: component_to_regex(component)
                        .with_context(|| format!("Invalid glob pattern: {}", pattern))?,
                    allows_hidden: component.starts_with('.'),
                }),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { components })
    }

    /// Whether a `/`-separated relative path matches
    pub fn is_match(&self, relative: &str) -> bool {
        let parts: Vec<&str> = relative.split('/').filter(|part| !part.is_empty()).collect();
        match_components(&self.components, &parts)
    }
}

fn match_components(components: &[GlobComponent], parts: &[&str]) -> bool {
    match components.split_first() {
        None => parts.is_empty(),
        Some((GlobComponent::AnyDepth, rest)) => {
            for skip in 0..=parts.len() {
                if match_components(rest, &parts[skip..]) {
                    return true;
                }
                if parts.get(skip).is_some_and(|part| part.starts_with('.')) {
                    return false;
                }
            }
            false
        }
        Some((GlobComponent::Name { regex, allows_hidden }, rest)) => match parts.split_first() {
            Some((part, tail)) => {
                (*allows_hidden || !part.starts_with('.'))
                    && regex.is_match(part)
                    && match_components(rest, tail)
            }
            None => false,
        },
    }
}

// Translates one path component (no `/`) into an anchored regex
fn component_to_regex(component: &str) -> Result<Regex> {
    let mut regex = String::from("^");
    let chars: Vec<char> = component.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '*' => {
                // Repeated stars inside a component act like a single one
                while chars.get(i + 1) == Some(&'*') {
                    i += 1;
                }
                regex.push_str(".*");
            }
            '?' => regex.push('.'),
            '[' => {
                let close = chars[i + 1..]
                    .iter()
                    .skip(1)
                    .position(|&c| c == ']')
                    .map(|offset| i + 2 + offset)
                    .ok_or_else(|| anyhow!("Unclosed character class in glob: {}", component))?;
                let mut class: String = chars[i + 1..close].iter().collect();
                if let Some(rest) = class.strip_prefix('!') {
                    class = format!("^{}", rest);
                }
                regex.push('[');
                regex.push_str(&class.replace('\\', "\\\\"));
                regex.push(']');
                i = close + 1;
                continue;
            }
            c => regex.push_str(&regex::escape(&c.to_string())),
        }
        i += 1;
    }

    regex.push('$');
    Ok(Regex::new(&regex)?)
}

/// Placeholder available in output filename templates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateField {
    /// Basename without extension
    Filename,
    /// Extension including the leading dot, empty when there is none
    Ext,
    /// Absolute directory of the input
    Dir,
    /// Basename with extension
    File,
}

impl TemplateField {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "filename" => Some(Self::Filename),
            "ext" => Some(Self::Ext),
            "dir" => Some(Self::Dir),
            "file" => Some(Self::File),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TemplatePart {
    Literal(String),
    Field(TemplateField),
}

/// Output filename template such as `{dir}/{filename}.srt`.
///
/// `{{` and `}}` produce literal braces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTemplate {
    parts: Vec<TemplatePart>,
}

impl OutputTemplate {
    /// Parse a template, rejecting unknown placeholders and unbalanced braces
    pub fn parse(template: &str) -> Result<Self> {
        if template.trim().is_empty() {
            return Err(anyhow!("Output template must not be empty"));
        }

        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut chars = template.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        if c == '}' {
                            closed = true;
                            break;
                        }
                        name.push(c);
                    }
                    if !closed {
                        return Err(anyhow!("Unbalanced '{{' in output template: {}", template));
                    }
                    let field = TemplateField::from_name(&name)
                        .ok_or_else(|| anyhow!("Unknown placeholder '{{{}}}' in output template: {}", name, template))?;
                    if !literal.is_empty() {
                        parts.push(TemplatePart::Literal(std::mem::take(&mut literal)));
                    }
                    parts.push(TemplatePart::Field(field));
                }
                '}' => return Err(anyhow!("Unbalanced '}}' in output template: {}", template)),
                c => literal.push(c),
            }
        }

        if !literal.is_empty() {
            parts.push(TemplatePart::Literal(literal));
        }
        Ok(Self { parts })
    }

    /// Output path for `input`
    pub fn render(&self, input: &Path) -> Result<PathBuf> {
        let absolute = std::path::absolute(input)
            .with_context(|| format!("Failed to resolve path: {:?}", input))?;
        let absolute = lexically_normalize(&absolute);

        let file = absolute
            .file_name()
            .ok_or_else(|| anyhow!("Input has no file name: {:?}", input))?
            .to_string_lossy()
            .into_owned();
        let (filename, ext) = split_extension(&file);
        let dir = absolute
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut output = String::new();
        for part in &self.parts {
            match part {
                TemplatePart::Literal(text) => output.push_str(text),
                TemplatePart::Field(TemplateField::Filename) => output.push_str(filename),
                TemplatePart::Field(TemplateField::Ext) => output.push_str(ext),
                TemplatePart::Field(TemplateField::Dir) => output.push_str(&dir),
                TemplatePart::Field(TemplateField::File) => output.push_str(&file),
            }
        }
        Ok(PathBuf::from(output))
    }
}

// `movie.en.ttml` -> (`movie.en`, `.ttml`); leading dots do not start an extension
fn split_extension(file: &str) -> (&str, &str) {
    let stem_start = file.len() - file.trim_start_matches('.').len();
    match file[stem_start..].rfind('.') {
        Some(dot) => file.split_at(stem_start + dot),
        None => (file, ""),
    }
}

fn lexically_normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
