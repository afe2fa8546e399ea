//! The probationary review form: four graded categories, the overall
//! classification and the per-review decision options.

use serde::{Deserialize, Serialize};

/// Which probationary checkpoint a review belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvaluationType {
    #[serde(rename = "40 dias")]
    FortyDays,
    #[serde(rename = "80 dias")]
    EightyDays,
}

impl EvaluationType {
    pub const ALL: [EvaluationType; 2] = [EvaluationType::FortyDays, EvaluationType::EightyDays];

    /// Label stored in the database and printed on the document.
    pub fn label(self) -> &'static str {
        match self {
            EvaluationType::FortyDays => "40 dias",
            EvaluationType::EightyDays => "80 dias",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let trimmed = label.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.label() == trimmed || t.target_days().to_string() == trimmed)
    }

    pub fn target_days(self) -> i64 {
        match self {
            EvaluationType::FortyDays => 40,
            EvaluationType::EightyDays => 80,
        }
    }

    /// Days since admission during which the review is due (inclusive).
    pub fn window(self) -> std::ops::RangeInclusive<i64> {
        let target = self.target_days();
        (target - 3)..=(target + 3)
    }

    pub fn decisions(self) -> &'static [&'static str] {
        match self {
            EvaluationType::FortyDays => &[
                "Aprovado para continuidade",
                "Continuidade com ressalvas",
                "Desligamento",
            ],
            EvaluationType::EightyDays => &[
                "Aprovado para efetivação",
                "Não efetivado (desligamento)",
            ],
        }
    }
}

/// Overall grade picked by the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    Excelente,
    Bom,
    Regular,
    #[serde(rename = "Insatisfatório")]
    Insatisfatorio,
}

impl Classification {
    pub const ALL: [Classification; 4] = [
        Classification::Excelente,
        Classification::Bom,
        Classification::Regular,
        Classification::Insatisfatorio,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Classification::Excelente => "Excelente",
            Classification::Bom => "Bom",
            Classification::Regular => "Regular",
            Classification::Insatisfatorio => "Insatisfatório",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let trimmed = label.trim();
        Self::ALL.into_iter().find(|c| {
            c.label().eq_ignore_ascii_case(trimmed)
                || (*c == Classification::Insatisfatorio && trimmed.eq_ignore_ascii_case("Insatisfatorio"))
        })
    }

    /// Grade matching a mean answer rank on the 1..=4 scale.
    pub fn from_mean_rank(mean: f64) -> Self {
        if mean >= 3.5 {
            Classification::Excelente
        } else if mean >= 2.5 {
            Classification::Bom
        } else if mean >= 1.5 {
            Classification::Regular
        } else {
            Classification::Insatisfatorio
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Attendance,
    Safety,
    Productivity,
    Teamwork,
}

/// A graded category and its canned answers, best first.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Criterion {
    pub category: Category,
    pub title: &'static str,
    pub choices: [&'static str; 4],
}

pub static RUBRIC: [Criterion; 4] = [
    Criterion {
        category: Category::Attendance,
        title: "Assiduidade e Pontualidade",
        choices: [
            "Sempre pontual e assíduo",
            "Raramente se atrasa ou falta",
            "Atrasos ou faltas ocasionais",
            "Atrasos ou faltas frequentes",
        ],
    },
    Criterion {
        category: Category::Safety,
        title: "Segurança do Trabalho",
        choices: [
            "Cumpre integralmente as normas de segurança",
            "Cumpre as normas com pequenas falhas",
            "Precisa de lembretes frequentes",
            "Descumpre normas de segurança",
        ],
    },
    Criterion {
        category: Category::Productivity,
        title: "Qualidade e Produtividade",
        choices: [
            "Supera as expectativas",
            "Atende às expectativas",
            "Atende parcialmente",
            "Abaixo do esperado",
        ],
    },
    Criterion {
        category: Category::Teamwork,
        title: "Trabalho em Equipe e Conduta",
        choices: [
            "Colaborativo e respeitoso",
            "Bom relacionamento com a equipe",
            "Dificuldades pontuais de relacionamento",
            "Conflitos recorrentes",
        ],
    },
];

impl Criterion {
    pub fn for_category(category: Category) -> &'static Criterion {
        match category {
            Category::Attendance => &RUBRIC[0],
            Category::Safety => &RUBRIC[1],
            Category::Productivity => &RUBRIC[2],
            Category::Teamwork => &RUBRIC[3],
        }
    }

    /// 4 for the first choice down to 1 for the last; `None` if not a choice.
    pub fn rank(&self, answer: &str) -> Option<u8> {
        self.choices
            .iter()
            .position(|c| *c == answer.trim())
            .map(|i| 4 - i as u8)
    }
}

/// Classification suggested by the mean rank of the answers, if all are valid.
pub fn suggested_classification(answers: &[(Category, &str)]) -> Option<Classification> {
    if answers.is_empty() {
        return None;
    }
    let ranks: Option<Vec<u8>> = answers
        .iter()
        .map(|(category, answer)| Criterion::for_category(*category).rank(answer))
        .collect();
    let ranks = ranks?;
    let mean = ranks.iter().map(|r| f64::from(*r)).sum::<f64>() / ranks.len() as f64;
    Some(Classification::from_mean_rank(mean))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windows() {
        assert_eq!(EvaluationType::FortyDays.window(), 37..=43);
        assert_eq!(EvaluationType::EightyDays.window(), 77..=83);
    }

    #[test]
    fn test_type_labels_round_trip() {
        for t in EvaluationType::ALL {
            assert_eq!(EvaluationType::from_label(t.label()), Some(t));
        }
        assert_eq!(EvaluationType::from_label("80"), Some(EvaluationType::EightyDays));
        assert_eq!(EvaluationType::from_label("60 dias"), None);
        assert_eq!(
            serde_json::to_string(&EvaluationType::FortyDays).unwrap(),
            "\"40 dias\""
        );
    }

    #[test]
    fn test_rank_orders_best_first() {
        let safety = Criterion::for_category(Category::Safety);
        assert_eq!(safety.rank("Cumpre integralmente as normas de segurança"), Some(4));
        assert_eq!(safety.rank("Descumpre normas de segurança"), Some(1));
        assert_eq!(safety.rank("Sempre pontual e assíduo"), None);
    }

    #[test]
    fn test_suggested_classification() {
        let best: Vec<(Category, &str)> = RUBRIC.iter().map(|c| (c.category, c.choices[0])).collect();
        assert_eq!(suggested_classification(&best), Some(Classification::Excelente));

        let mixed = [
            (Category::Attendance, RUBRIC[0].choices[1]),
            (Category::Safety, RUBRIC[1].choices[2]),
            (Category::Productivity, RUBRIC[2].choices[1]),
            (Category::Teamwork, RUBRIC[3].choices[2]),
        ];
        // ranks 3,2,3,2 -> 2.5
        assert_eq!(suggested_classification(&mixed), Some(Classification::Bom));

        let worst: Vec<(Category, &str)> = RUBRIC.iter().map(|c| (c.category, c.choices[3])).collect();
        assert_eq!(suggested_classification(&worst), Some(Classification::Insatisfatorio));

        assert_eq!(suggested_classification(&[(Category::Safety, "???")]), None);
    }

    #[test]
    fn test_classification_labels() {
        assert_eq!(Classification::from_label("Insatisfatório"), Some(Classification::Insatisfatorio));
        assert_eq!(Classification::from_label("insatisfatorio"), Some(Classification::Insatisfatorio));
        assert_eq!(Classification::from_label(" bom "), Some(Classification::Bom));
    }
}
