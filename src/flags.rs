//! Flag resolution and statement formatting
//!
//! A template's option tree is flattened into its flags in document order,
//! user overrides are merged over the defaults, and every flag becomes one
//! `setq(<id>,<1|nil>)` statement. The output order is the traversal order,
//! so the same selection always renders to the same statements.

use std::collections::{BTreeMap, HashMap};
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{Config, ScanSettings};
use crate::error::{Error, Result};
use crate::repository::CheckoutManager;
use crate::scanner::scan_file;
use crate::template::{OptionVariant, PresetOption, Template};

/// Where a selection's template lives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PresetSource {
    /// A file inside a configured repository's checkout
    Repository { repository: String, path: PathBuf },
    /// A file on the local filesystem
    Local { path: PathBuf },
}

/// A template reference plus the flags the user changed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetSelection {
    pub source: PresetSource,
    #[serde(default)]
    pub edited_flags: BTreeMap<String, bool>,
}

impl PresetSelection {
    /// Load the template this selection refers to.
    ///
    /// Repository sources are checked out through `manager` first.
    pub fn load_template(
        &self,
        config: &Config,
        manager: &CheckoutManager,
        settings: &ScanSettings,
    ) -> Result<Template> {
        let path = match &self.source {
            PresetSource::Local { path } => path.clone(),
            PresetSource::Repository { repository, path } => {
                let spec = config
                    .repository(repository)
                    .ok_or_else(|| Error::UnknownRepository {
                        name: repository.clone(),
                    })?;
                check_repository_path(path)?;
                let checkout = manager.ensure_checkout(
                    &spec.name,
                    &spec.origin,
                    &spec.r#ref,
                    spec.revision.as_deref(),
                )?;
                checkout.join(path)
            }
        };

        scan_file(&path, settings)?.ok_or(Error::TemplateNotFound { path })
    }

    /// Render this selection against an already loaded template.
    pub fn format(&self, template: &Template) -> Result<Vec<ResolvedFlag>> {
        format_flag_settings(template, &self.edited_flags)
    }
}

/// Repository paths must stay inside the checkout.
fn check_repository_path(path: &Path) -> Result<()> {
    let escapes = path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes || path.as_os_str().is_empty() {
        return Err(Error::TemplateValidation {
            field: "source.path".to_string(),
            message: format!(
                "'{}' must be a relative path inside the repository",
                path.display()
            ),
        });
    }
    Ok(())
}

/// Whether a flag's value came from the template or from the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagSource {
    Default,
    User,
}

/// One flag, ready to hand to the analysis tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedFlag {
    pub flag_id: String,
    pub normalized_id: String,
    pub value: bool,
    pub source: FlagSource,
    pub statement: String,
}

/// A template's flags with their defaults, in traversal order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlagSet {
    pub defaults: HashMap<String, bool>,
    pub order: Vec<String>,
}

fn collect_flags(options: &[PresetOption], flags: &mut FlagSet) {
    for option in options {
        match &option.variant {
            OptionVariant::Group { children } => collect_flags(children, flags),
            OptionVariant::Flag { default } => {
                // A repeated id keeps its first position, the last default wins
                if flags
                    .defaults
                    .insert(option.id.clone(), default.unwrap_or(false))
                    .is_none()
                {
                    flags.order.push(option.id.clone());
                }
            }
        }
    }
}

/// Flatten `template`'s flags and check every override names one of them.
pub fn resolve_flags(template: &Template, overrides: &BTreeMap<String, bool>) -> Result<FlagSet> {
    let mut flags = FlagSet::default();
    collect_flags(&template.options, &mut flags);

    if let Some(unknown) = overrides.keys().find(|id| !flags.defaults.contains_key(*id)) {
        return Err(Error::UnknownFlag {
            flag: unknown.clone(),
        });
    }
    Ok(flags)
}

/// Turn a flag id into an identifier the analysis tool accepts
pub fn normalize_flag_id(id: &str) -> String {
    let mut normalized: String = id
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if normalized.starts_with(|c: char| c.is_ascii_digit()) {
        normalized.insert(0, '_');
    }
    normalized
}

/// Resolve every flag of `template` to its statement, in traversal order.
pub fn format_flag_settings(
    template: &Template,
    overrides: &BTreeMap<String, bool>,
) -> Result<Vec<ResolvedFlag>> {
    let flags = resolve_flags(template, overrides)?;

    Ok(flags
        .order
        .iter()
        .map(|id| {
            let (value, source) = match overrides.get(id) {
                Some(value) => (*value, FlagSource::User),
                None => (flags.defaults[id], FlagSource::Default),
            };
            let normalized_id = normalize_flag_id(id);
            let statement = format!(
                "setq({},{})",
                normalized_id,
                if value { "1" } else { "nil" }
            );
            ResolvedFlag {
                flag_id: id.clone(),
                normalized_id,
                value,
                source,
                statement,
            }
        })
        .collect())
}
