//! Static translation table for the board's display strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::task::TaskStatus;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Ja,
    En,
    Zh,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Ja, Language::En, Language::Zh];

    pub fn code(self) -> &'static str {
        match self {
            Language::Ja => "ja",
            Language::En => "en",
            Language::Zh => "zh",
        }
    }

    pub fn next(self) -> Language {
        match self {
            Language::Ja => Language::En,
            Language::En => Language::Zh,
            Language::Zh => Language::Ja,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .into_iter()
            .find(|lang| lang.code().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unsupported language {s:?} (expected ja, en or zh)"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TranslationKey {
    NotStarted,
    InProgress,
    Completed,
    AddTask,
    NewTask,
    Title,
    Description,
    Labels,
    Cancel,
    Add,
    Congratulations,
}

impl From<TaskStatus> for TranslationKey {
    fn from(status: TaskStatus) -> Self {
        match status {
            TaskStatus::NotStarted => TranslationKey::NotStarted,
            TaskStatus::InProgress => TranslationKey::InProgress,
            TaskStatus::Completed => TranslationKey::Completed,
        }
    }
}

pub fn translate(language: Language, key: TranslationKey) -> &'static str {
    use TranslationKey::*;
    match language {
        Language::Ja => match key {
            NotStarted => "未着手",
            InProgress => "進行中",
            Completed => "完了",
            AddTask => "タスクを追加",
            NewTask => "新しいタスク",
            Title => "タイトル",
            Description => "説明",
            Labels => "ラベル",
            Cancel => "キャンセル",
            Add => "追加",
            Congratulations => "おめでとうございます！",
        },
        Language::En => match key {
            NotStarted => "Not Started",
            InProgress => "In Progress",
            Completed => "Completed",
            AddTask => "Add Task",
            NewTask => "New Task",
            Title => "Title",
            Description => "Description",
            Labels => "Labels",
            Cancel => "Cancel",
            Add => "Add",
            Congratulations => "Congratulations!",
        },
        Language::Zh => match key {
            NotStarted => "未开始",
            InProgress => "进行中",
            Completed => "已完成",
            AddTask => "添加任务",
            NewTask => "新任务",
            Title => "标题",
            Description => "描述",
            Labels => "标签",
            Cancel => "取消",
            Add => "添加",
            Congratulations => "恭喜！",
        },
    }
}

/// Holds the active language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Localizer {
    language: Language,
}

impl Localizer {
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub fn cycle(&mut self) -> Language {
        self.language = self.language.next();
        self.language
    }

    pub fn t(&self, key: impl Into<TranslationKey>) -> &'static str {
        translate(self.language, key.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Language::Ja, "未着手")]
    #[case(Language::En, "Not Started")]
    #[case(Language::Zh, "未开始")]
    fn status_column_titles(#[case] language: Language, #[case] expected: &str) {
        assert_eq!(Localizer::new(language).t(TaskStatus::NotStarted), expected);
    }

    #[test]
    fn japanese_is_the_default() {
        assert_eq!(Localizer::default().t(TranslationKey::Congratulations), "おめでとうございます！");
    }

    #[test]
    fn set_language_switches_lookups() {
        let mut l10n = Localizer::default();
        l10n.set_language(Language::Zh);
        assert_eq!(l10n.t(TranslationKey::AddTask), "添加任务");
    }

    #[test]
    fn cycle_visits_every_language() {
        let mut l10n = Localizer::default();
        assert_eq!(l10n.cycle(), Language::En);
        assert_eq!(l10n.cycle(), Language::Zh);
        assert_eq!(l10n.cycle(), Language::Ja);
    }

    #[rstest]
    #[case("ja", Ok(Language::Ja))]
    #[case("EN", Ok(Language::En))]
    #[case("zh", Ok(Language::Zh))]
    fn language_codes_parse(#[case] raw: &str, #[case] expected: Result<Language, String>) {
        assert_eq!(raw.parse::<Language>(), expected);
    }

    #[test]
    fn unknown_language_is_rejected() {
        assert!("fr".parse::<Language>().is_err());
    }
}
