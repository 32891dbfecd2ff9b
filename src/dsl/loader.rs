//! Declarative grammar files
//!
//! Grammars can be written as YAML or JSON instead of builder calls:
//!
//! ```yaml
//! name: lists
//! tokens:
//!   ITEM: "[a-z]+"
//!   COMMA: ","
//!   AND: and                 # a bare word becomes a keyword token
//!   KEY:                     # detailed form
//!     pattern: "[a-z]+"
//!     lookahead: "\\s*:"
//! rules:
//!   - name: list
//!     pattern: [list, COMMA, ITEM]
//!     action: $append
//!   - name: list
//!     pattern: [ITEM]
//!     action: $single
//! context:
//!   separator: ","
//! ```
//!
//! Token order in the file is registration order, which decides tokenizer ties, so the
//! token table is read and written as an ordered map. Rules list one alternative per entry,
//! in registration order.
//!
//! Actions are code and cannot be stored in a file: an entry names its action and the
//! action has to be registered on the loaded grammar (builtin actions always resolve).
//! Parsing with unregistered actions needs a lenient [`ParserConfig`].
//!
//! # Round trips
//!
//! A plain string value that is a bare identifier loads as a keyword. Saving therefore
//! writes keywords as their bare word and uses the detailed form for any token that would
//! otherwise come back different: regex tokens that look like a bare word, lookaround
//! tokens, custom priorities.

use crate::dsl::config::ParserConfig;
use crate::dsl::engine::Dsl;
use crate::dsl::error::GrammarError;
use crate::dsl::grammar::{
    Alternative, Associativity, Grammar, Token, TokenKind, DEFAULT_PRIORITY, KEYWORD_PRIORITY,
    LOOKAROUND_PRIORITY,
};
use crate::dsl::value::Value;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Plain token patterns matching this are loaded as keywords
static BARE_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML grammar: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON grammar: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid grammar: {0}")]
    Grammar(#[from] GrammarError),

    #[error("unknown grammar file format for {0} (expected .yaml, .yml or .json)")]
    UnknownFormat(PathBuf),
}

/// Serialization format of a grammar file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
}

impl Format {
    /// Pick the format from the file extension
    pub fn from_path(path: &Path) -> Result<Self, LoaderError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("yaml") | Some("yml") => Ok(Format::Yaml),
            Some("json") => Ok(Format::Json),
            _ => Err(LoaderError::UnknownFormat(path.to_path_buf())),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "yaml" | "yml" => Some(Format::Yaml),
            "json" => Some(Format::Json),
            _ => None,
        }
    }
}

/// A token entry: a plain pattern string, or the detailed form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TokenConfig {
    Pattern(String),
    Detailed(TokenSpec),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSpec {
    pub pattern: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lookahead: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lookbehind: Option<String>,
    /// Treat `pattern` as a literal, case-insensitive word
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub keyword: bool,
}

impl TokenConfig {
    /// The token this entry describes
    pub fn to_token(&self, name: &str) -> Result<Token, GrammarError> {
        match self {
            TokenConfig::Pattern(pattern) if BARE_WORD.is_match(pattern) => {
                Token::keyword(name, pattern)
            }
            TokenConfig::Pattern(pattern) => Token::new(name, pattern, DEFAULT_PRIORITY),
            TokenConfig::Detailed(spec) => spec.to_token(name),
        }
    }

    /// The shortest entry that loads back as `token`
    pub fn from_token(token: &Token) -> Self {
        let plain = match token.kind {
            TokenKind::Keyword => {
                token.priority == KEYWORD_PRIORITY && BARE_WORD.is_match(&token.pattern)
            }
            TokenKind::Pattern => {
                token.priority == DEFAULT_PRIORITY && !BARE_WORD.is_match(&token.pattern)
            }
            TokenKind::Lookaround => false,
        };
        if plain {
            return TokenConfig::Pattern(token.pattern.clone());
        }

        let default_priority = match token.kind {
            TokenKind::Keyword => KEYWORD_PRIORITY,
            TokenKind::Lookaround => LOOKAROUND_PRIORITY,
            TokenKind::Pattern => DEFAULT_PRIORITY,
        };
        TokenConfig::Detailed(TokenSpec {
            pattern: token.pattern.clone(),
            priority: (token.priority != default_priority).then_some(token.priority),
            lookahead: token.lookahead.clone(),
            lookbehind: token.lookbehind.clone(),
            keyword: token.kind == TokenKind::Keyword,
        })
    }
}

impl TokenSpec {
    fn to_token(&self, name: &str) -> Result<Token, GrammarError> {
        let lookaround = self.lookahead.is_some() || self.lookbehind.is_some();
        if self.keyword && lookaround {
            return Err(GrammarError::KeywordLookaround(name.to_string()));
        }

        let token = if self.keyword {
            Token::keyword(name, &self.pattern)?
        } else if lookaround {
            Token::with_lookaround(
                name,
                &self.pattern,
                self.lookahead.as_deref(),
                self.lookbehind.as_deref(),
            )?
        } else {
            Token::new(name, &self.pattern, DEFAULT_PRIORITY)?
        };
        Ok(match self.priority {
            Some(priority) => token.with_priority(priority),
            None => token,
        })
    }
}

/// One alternative of a rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    pub name: String,
    #[serde(default)]
    pub pattern: Vec<String>,
    #[serde(default)]
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precedence: Option<i32>,
    #[serde(default, rename = "assoc", skip_serializing_if = "Option::is_none")]
    pub associativity: Option<Associativity>,
}

impl RuleConfig {
    fn from_alternative(rule: &str, alternative: &Alternative) -> Self {
        Self {
            name: rule.to_string(),
            pattern: alternative.symbols.clone(),
            action: alternative.action.clone(),
            precedence: (alternative.precedence != 0).then_some(alternative.precedence),
            associativity: (alternative.associativity != Associativity::None)
                .then_some(alternative.associativity),
        }
    }

    fn to_alternative(&self) -> Alternative {
        let symbols: Vec<&str> = self.pattern.iter().map(String::as_str).collect();
        Alternative::new(&symbols, &self.action).with_precedence(
            self.precedence.unwrap_or(0),
            self.associativity.unwrap_or_default(),
        )
    }
}

/// The file representation of a DSL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrammarConfig {
    pub name: String,
    #[serde(
        default,
        serialize_with = "serialize_tokens",
        deserialize_with = "deserialize_tokens"
    )]
    pub tokens: Vec<(String, TokenConfig)>,
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub context: BTreeMap<String, Value>,
    /// Only needed when the start rule is not the first rule
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
}

impl GrammarConfig {
    pub fn from_str(text: &str, format: Format) -> Result<Self, LoaderError> {
        Ok(match format {
            Format::Yaml => serde_yaml::from_str(text)?,
            Format::Json => serde_json::from_str(text)?,
        })
    }

    /// Describe everything registered on `dsl`, except action code
    pub fn from_dsl(dsl: &Dsl) -> Self {
        let grammar = dsl.grammar();
        let tokens = grammar
            .tokens()
            .iter()
            .map(|token| (token.name.clone(), TokenConfig::from_token(token)))
            .collect();
        let rules = grammar
            .rules()
            .iter()
            .flat_map(|rule| {
                rule.alternatives
                    .iter()
                    .map(move |alternative| RuleConfig::from_alternative(&rule.name, alternative))
            })
            .collect();
        let first = grammar.rules().first().map(|rule| rule.name.as_str());
        let start = grammar
            .start_rule()
            .filter(|start| Some(*start) != first)
            .map(str::to_string);

        Self {
            name: dsl.name().to_string(),
            tokens,
            rules,
            context: dsl.context().into(),
            start,
        }
    }

    pub fn to_string(&self, format: Format) -> Result<String, LoaderError> {
        Ok(match format {
            Format::Yaml => serde_yaml::to_string(self)?,
            Format::Json => serde_json::to_string_pretty(self)?,
        })
    }

    /// Write to `path`, in the format its extension names
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), LoaderError> {
        let path = path.as_ref();
        let text = self.to_string(Format::from_path(path)?)?;
        fs::write(path, text).map_err(|source| LoaderError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn build(&self) -> Result<Dsl, LoaderError> {
        self.build_with(ParserConfig::default())
    }

    pub fn build_with(&self, config: ParserConfig) -> Result<Dsl, LoaderError> {
        let mut grammar = Grammar::new();
        for (name, token) in &self.tokens {
            grammar.register_token(token.to_token(name)?)?;
        }
        for rule in &self.rules {
            grammar.add_alternative(&rule.name, rule.to_alternative())?;
        }
        if let Some(start) = &self.start {
            grammar.set_start(start)?;
        }

        let mut dsl = Dsl::with_grammar(&self.name, grammar);
        for (name, value) in &self.context {
            dsl.set_context(name, value.clone());
        }
        dsl.set_config(config);

        log::debug!(
            "built '{}': {} tokens, {} alternatives",
            self.name,
            self.tokens.len(),
            self.rules.len()
        );
        Ok(dsl)
    }
}

fn serialize_tokens<S>(tokens: &[(String, TokenConfig)], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(tokens.len()))?;
    for (name, token) in tokens {
        map.serialize_entry(name, token)?;
    }
    map.end()
}

fn deserialize_tokens<'de, D>(deserializer: D) -> Result<Vec<(String, TokenConfig)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct TokenTable;

    impl<'de> Visitor<'de> for TokenTable {
        type Value = Vec<(String, TokenConfig)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of token names to patterns")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut tokens = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry::<String, TokenConfig>()? {
                tokens.push(entry);
            }
            Ok(tokens)
        }
    }

    deserializer.deserialize_map(TokenTable)
}

/// Reads grammar files into ready-to-use [`Dsl`]s
///
/// String-based loading is the core; path-based loading reads the file, picks the format
/// from the extension and delegates.
#[derive(Debug, Clone, Default)]
pub struct GrammarLoader {
    config: ParserConfig,
}

impl GrammarLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loaded DSLs parse with `config`
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    pub fn from_string(&self, text: &str, format: Format) -> Result<Dsl, LoaderError> {
        GrammarConfig::from_str(text, format)?.build_with(self.config.clone())
    }

    pub fn load_config<P: AsRef<Path>>(&self, path: P) -> Result<GrammarConfig, LoaderError> {
        let path = path.as_ref();
        let format = Format::from_path(path)?;
        let text = fs::read_to_string(path).map_err(|source| LoaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        GrammarConfig::from_str(&text, format)
    }

    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<Dsl, LoaderError> {
        let path = path.as_ref();
        log::debug!("loading grammar from {}", path.display());
        self.load_config(path)?.build_with(self.config.clone())
    }

    /// Save the grammar and context of `dsl` to `path`
    pub fn save<P: AsRef<Path>>(&self, dsl: &Dsl, path: P) -> Result<(), LoaderError> {
        GrammarConfig::from_dsl(dsl).save(path)
    }
}
