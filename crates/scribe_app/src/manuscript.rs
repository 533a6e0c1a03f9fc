use std::collections::BTreeMap;
use std::fs;
use std::io::Write as _;
use std::path::Path;

use anyhow::Context;
use chrono::Utc;
use client_logging::{client_info, client_warn};
use scribe_core::{ActionKind, AppState, Field, Msg};
use serde::{Deserialize, Serialize};

/// On-disk manuscript document: the draft inputs plus whatever sections
/// have been generated so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Manuscript {
    pub title: String,
    #[serde(default)]
    pub outline: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub education_level: String,
    #[serde(default)]
    pub word_count: String,
    #[serde(default)]
    pub sections: Sections,
    /// Extra prompt text per section, keyed by section name (for example
    /// `"body"` or `"abstract_cn"`).
    #[serde(default)]
    pub custom_prompts: BTreeMap<String, String>,
    /// RFC 3339 timestamp of the last save.
    #[serde(default)]
    pub saved_at: Option<String>,
}

fn action_for_key(key: &str) -> Option<ActionKind> {
    match key {
        "abstract_cn" => Some(ActionKind::AbstractCn),
        "keywords_cn" => Some(ActionKind::KeywordsCn),
        "abstract_en" => Some(ActionKind::AbstractEn),
        "keywords_en" => Some(ActionKind::KeywordsEn),
        "body" => Some(ActionKind::Body),
        "references" => Some(ActionKind::References),
        "acknowledgement" => Some(ActionKind::Acknowledgement),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Sections {
    #[serde(default)]
    pub abstract_cn: Option<String>,
    #[serde(default)]
    pub keywords_cn: Option<String>,
    #[serde(default)]
    pub abstract_en: Option<String>,
    #[serde(default)]
    pub keywords_en: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub references: Option<String>,
    #[serde(default)]
    pub acknowledgement: Option<String>,
}

impl Sections {
    fn slot(&mut self, action: ActionKind) -> &mut Option<String> {
        match action {
            ActionKind::AbstractCn => &mut self.abstract_cn,
            ActionKind::KeywordsCn => &mut self.keywords_cn,
            ActionKind::AbstractEn => &mut self.abstract_en,
            ActionKind::KeywordsEn => &mut self.keywords_en,
            ActionKind::Body => &mut self.body,
            ActionKind::References => &mut self.references,
            ActionKind::Acknowledgement => &mut self.acknowledgement,
        }
    }

    fn get(&self, action: ActionKind) -> Option<&String> {
        match action {
            ActionKind::AbstractCn => self.abstract_cn.as_ref(),
            ActionKind::KeywordsCn => self.keywords_cn.as_ref(),
            ActionKind::AbstractEn => self.abstract_en.as_ref(),
            ActionKind::KeywordsEn => self.keywords_en.as_ref(),
            ActionKind::Body => self.body.as_ref(),
            ActionKind::References => self.references.as_ref(),
            ActionKind::Acknowledgement => self.acknowledgement.as_ref(),
        }
    }

    fn restore_pairs(&self) -> Vec<(ActionKind, String)> {
        ActionKind::ALL
            .iter()
            .filter_map(|&action| {
                self.get(action)
                    .filter(|content| !content.is_empty())
                    .map(|content| (action, content.clone()))
            })
            .collect()
    }
}

pub fn load(path: &Path) -> anyhow::Result<Manuscript> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read manuscript {}", path.display()))?;
    let manuscript: Manuscript = ron::from_str(&content)
        .with_context(|| format!("failed to parse manuscript {}", path.display()))?;
    client_info!("Loaded manuscript from {}", path.display());
    Ok(manuscript)
}

/// Writes the manuscript atomically: temp file in the same directory, then
/// rename over the target.
pub fn save(path: &Path, manuscript: &Manuscript) -> anyhow::Result<()> {
    let mut manuscript = manuscript.clone();
    manuscript.saved_at = Some(Utc::now().to_rfc3339());

    let pretty = ron::ser::PrettyConfig::new();
    let content = ron::ser::to_string_pretty(&manuscript, pretty)
        .context("failed to serialize manuscript")?;

    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let mut tmp = match dir {
        Some(dir) => tempfile::NamedTempFile::new_in(dir),
        None => tempfile::NamedTempFile::new_in("."),
    }
    .context("failed to create temp file for manuscript")?;
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    tmp.persist(path)
        .map_err(|err| err.error)
        .with_context(|| format!("failed to write manuscript {}", path.display()))?;
    client_info!("Saved manuscript to {}", path.display());
    Ok(())
}

/// Messages that seed a fresh state machine from a loaded manuscript.
pub fn seed_messages(manuscript: &Manuscript) -> Vec<Msg> {
    let mut messages = vec![
        Msg::FieldEdited {
            field: Field::Title,
            text: manuscript.title.clone(),
        },
        Msg::FieldEdited {
            field: Field::Outline,
            text: manuscript.outline.clone(),
        },
        Msg::FieldEdited {
            field: Field::Subject,
            text: manuscript.subject.clone(),
        },
        Msg::FieldEdited {
            field: Field::EducationLevel,
            text: manuscript.education_level.clone(),
        },
        Msg::FieldEdited {
            field: Field::WordCount,
            text: manuscript.word_count.clone(),
        },
    ];
    for (key, text) in &manuscript.custom_prompts {
        match action_for_key(key) {
            Some(action) => messages.push(Msg::CustomPromptEdited {
                action,
                text: text.clone(),
            }),
            None => client_warn!("Ignoring custom prompt for unknown section {key:?}"),
        }
    }
    let restored = manuscript.sections.restore_pairs();
    if !restored.is_empty() {
        messages.push(Msg::RestoreOutputs(restored));
    }
    messages
}

/// Copies generated slots from the state machine back into the document.
pub fn absorb_outputs(manuscript: &mut Manuscript, state: &AppState) {
    for action in ActionKind::ALL {
        let content = state.output(action);
        if !content.is_empty() {
            *manuscript.sections.slot(action) = Some(content.to_string());
        }
    }
}
