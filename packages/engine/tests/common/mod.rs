#![allow(dead_code)]

use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone, Utc};

use certprep_engine::{
    Domain, ExamConfig, Objective, ObjectiveCatalog, Pack, Question, QuestionType,
};

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap()
}

pub fn catalog() -> ObjectiveCatalog {
    let objective = |id: &str, domain: &str| Objective {
        id: id.to_string(),
        title: format!("Objective {id}"),
        domain_id: domain.to_string(),
    };
    ObjectiveCatalog {
        exam_code: "EX-101".to_string(),
        domains: vec![
            Domain { id: "1.0".to_string(), title: "Concepts".to_string() },
            Domain { id: "2.0".to_string(), title: "Operations".to_string() },
        ],
        objectives: vec![objective("1.1", "1.0"), objective("1.2", "1.0"), objective("2.1", "2.0")],
    }
}

pub fn question(id: &str, kind: QuestionType, objectives: &[&str], tags: &[&str]) -> Question {
    Question {
        id: id.to_string(),
        question_type: kind,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        objective_ids: objectives.iter().map(|o| o.to_string()).collect(),
        misconception_tags: Vec::new(),
        scenario: false,
        difficulty: None,
        estimated_seconds: None,
    }
}

pub fn pack(id: &str, questions: Vec<Question>) -> Pack {
    Pack {
        id: id.to_string(),
        question_bank: questions,
        ..Default::default()
    }
}

/// Two questions on 1.1, one on 2.1, nothing on 1.2.
pub fn scenario_packs() -> Vec<Pack> {
    vec![pack(
        "pack-ch01",
        vec![
            question("q-11-a", QuestionType::SingleChoice, &["1.1"], &[]),
            question("q-11-b", QuestionType::Matching, &["1.1"], &[]),
            question("q-21-a", QuestionType::Ordering, &["2.1"], &[]),
        ],
    )]
}

/// `per_objective` questions for every catalog objective, mixed types.
pub fn large_packs(per_objective: usize) -> Vec<Pack> {
    let kinds = [
        QuestionType::SingleChoice,
        QuestionType::MultiSelect,
        QuestionType::Ordering,
        QuestionType::Matching,
    ];
    let questions = ["1.1", "1.2", "2.1"]
        .iter()
        .flat_map(|objective| {
            (0..per_objective).map(move |i| {
                let id = format!("q-{objective}-{i}");
                let mut q = question(&id, kinds[i % kinds.len()], &[*objective], &[]);
                q.scenario = i % 5 == 0;
                q
            })
        })
        .collect();
    vec![pack("pack-all", questions)]
}

pub fn exam_config(total: usize) -> ExamConfig {
    ExamConfig {
        total_questions: total,
        domain_weights: BTreeMap::from([("1.0".to_string(), 0.5), ("2.0".to_string(), 0.5)]),
        ..Default::default()
    }
}
