//! Export groups: named sets of sprite-name patterns, each packed into its own page series.
//!
//! Group file syntax:
//!
//! ```text
//! ui
//!   - ui/*
//!   - "icons/big?"
//! enemies - enemies/* - bosses/*
//! ```
//!
//! A group name is followed by any number of `- pattern` entries. Names and patterns are bare
//! words (`A-Z a-z 0-9 / . - _ * ?`) or double-quoted strings. Patterns match whole sprite names;
//! `*` matches any run of characters (including `/`) and `?` exactly one.

use crate::config::PackerConfig;
use crate::error::{Result, SpritePackerError};
use crate::model::{Packing, Request};
use crate::paging::pack_pages;
use globset::{GlobBuilder, GlobMatcher};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[derive(Debug, Clone)]
pub struct ExportGroup {
    pub name: String,
    pub patterns: Vec<String>,
    matchers: Vec<GlobMatcher>,
}

impl ExportGroup {
    pub fn new(name: impl Into<String>, patterns: Vec<String>) -> Result<Self> {
        let matchers = patterns
            .iter()
            .map(|p| compile_pattern(p))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            name: name.into(),
            patterns,
            matchers,
        })
    }

    pub fn matches(&self, sprite_name: &str) -> bool {
        self.matchers.iter().any(|m| m.is_match(sprite_name))
    }
}

/// Groups in file order. The first group with a matching pattern claims a sprite.
#[derive(Debug, Clone, Default)]
pub struct ExportGroups {
    groups: Vec<ExportGroup>,
}

impl ExportGroups {
    pub fn parse(src: &str) -> Result<Self> {
        let mut cursor = Cursor { src, pos: 0 };
        let mut groups: Vec<ExportGroup> = Vec::new();
        loop {
            cursor.skip_whitespace();
            if cursor.is_over() {
                break;
            }
            let name_at = cursor.pos;
            let name = cursor.read_string()?;
            if groups.iter().any(|g| g.name == name) {
                return Err(SpritePackerError::GroupSyntax {
                    offset: name_at,
                    message: format!("duplicate group {name:?}"),
                });
            }
            cursor.skip_whitespace();
            let mut patterns = Vec::new();
            while cursor.peek() == Some('-') {
                cursor.pos += 1;
                cursor.skip_whitespace();
                patterns.push(cursor.read_string()?);
                cursor.skip_whitespace();
            }
            groups.push(ExportGroup::new(name, patterns)?);
        }
        Ok(Self { groups })
    }

    pub fn groups(&self) -> &[ExportGroup] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Name of the group that claims `sprite_name`, if any.
    pub fn group_for(&self, sprite_name: &str) -> Option<&str> {
        self.groups
            .iter()
            .find(|g| g.matches(sprite_name))
            .map(|g| g.name.as_str())
    }

    /// Splits requests by group. Named groups come first in file order, then the default group
    /// (`None`) with every unclaimed request. Groups without requests are left out.
    pub fn partition<T>(
        &self,
        requests: Vec<Request<T>>,
        name_of: impl Fn(&Request<T>) -> &str,
    ) -> Vec<(Option<String>, Vec<Request<T>>)> {
        let mut buckets: Vec<Vec<Request<T>>> =
            (0..=self.groups.len()).map(|_| Vec::new()).collect();
        for r in requests {
            let idx = self
                .groups
                .iter()
                .position(|g| g.matches(name_of(&r)))
                .unwrap_or(self.groups.len());
            buckets[idx].push(r);
        }
        buckets
            .into_iter()
            .enumerate()
            .filter(|(_, b)| !b.is_empty())
            .map(|(i, b)| (self.groups.get(i).map(|g| g.name.clone()), b))
            .collect()
    }
}

/// Packs each group into its own page series.
///
/// Groups share nothing while packing; with the `parallel` feature and `cfg.parallel` they run
/// on the rayon pool. Results keep the input group order, and the first failing group's error is
/// returned.
pub fn pack_groups<T: Clone + Send>(
    groups: Vec<(Option<String>, Vec<Request<T>>)>,
    cfg: &PackerConfig,
) -> Result<Vec<(Option<String>, Vec<Packing<T>>)>> {
    #[cfg(feature = "parallel")]
    {
        if cfg.parallel {
            return groups
                .into_par_iter()
                .map(|(name, requests)| pack_pages(requests, cfg).map(|pages| (name, pages)))
                .collect();
        }
    }

    groups
        .into_iter()
        .map(|(name, requests)| pack_pages(requests, cfg).map(|pages| (name, pages)))
        .collect()
}

/// Literal text except `*` and `?`. Runs of `*` collapse to one so they never read as `**`.
fn compile_pattern(pattern: &str) -> Result<GlobMatcher> {
    let mut glob = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        match c {
            '*' if glob.ends_with('*') => {}
            '*' | '?' => glob.push(c),
            '[' | ']' | '{' | '}' | '\\' | ',' | '!' => {
                glob.push('\\');
                glob.push(c);
            }
            _ => glob.push(c),
        }
    }
    GlobBuilder::new(&glob)
        .literal_separator(false)
        .backslash_escape(true)
        .build()
        .map(|g| g.compile_matcher())
        .map_err(|source| SpritePackerError::GroupPattern {
            pattern: pattern.to_string(),
            source,
        })
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl Cursor<'_> {
    fn is_over(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !matches!(c, ' ' | '\t' | '\n' | '\r') {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn error(&self, message: &str) -> SpritePackerError {
        SpritePackerError::GroupSyntax {
            offset: self.pos,
            message: message.to_string(),
        }
    }

    fn read_string(&mut self) -> Result<String> {
        if self.peek() == Some('"') {
            self.pos += 1;
            let rest = &self.src[self.pos..];
            let Some(end) = rest.find('"') else {
                return Err(self.error("unterminated string"));
            };
            if end == 0 {
                return Err(self.error("empty string"));
            }
            let value = rest[..end].to_string();
            self.pos += end + 1;
            return Ok(value);
        }

        let start = self.pos;
        while let Some(c) = self.peek() {
            if !(c.is_ascii_alphanumeric() || matches!(c, '/' | '.' | '-' | '_' | '*' | '?')) {
                break;
            }
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error("expected a name or pattern"));
        }
        Ok(self.src[start..self.pos].to_string())
    }
}
