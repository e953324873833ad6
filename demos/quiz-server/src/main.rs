use std::sync::Arc;

use duelquiz::prelude::*;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Seed data
// ---------------------------------------------------------------------------

const FIELDS: &[(&str, &[(&str, &str)])] = &[
    (
        "Geography",
        &[
            ("Capital of France?", "Paris"),
            ("Capital of Japan?", "Tokyo"),
            ("Capital of Peru?", "Lima"),
            ("Capital of Norway?", "Oslo"),
            ("Capital of Kenya?", "Nairobi"),
        ],
    ),
    (
        "Chemistry",
        &[
            ("Symbol for gold?", "Au"),
            ("Symbol for iron?", "Fe"),
            ("Symbol for sodium?", "Na"),
            ("Symbol for tin?", "Sn"),
        ],
    ),
];

const USERS: &[(u64, &str)] = &[(1, "alice"), (2, "bob"), (3, "carol")];

fn seed_catalog() -> InMemoryCatalog {
    let catalog = InMemoryCatalog::new();
    let mut next_id = 1;
    for (field_index, (field_text, questions)) in FIELDS.iter().enumerate() {
        let field = Field {
            field_id: FieldId(field_index as u64 + 1),
            field_text: (*field_text).to_string(),
        };
        for (question_text, answer) in *questions {
            catalog.insert(Question {
                question_id: QuestionId(next_id),
                question_text: (*question_text).to_string(),
                field: field.clone(),
                correct_answer: AnswerOption {
                    option_id: OptionId(next_id),
                    option_text: (*answer).to_string(),
                },
            });
            next_id += 1;
        }
    }
    catalog
}

fn seed_directory() -> InMemoryDirectory {
    let directory = InMemoryDirectory::new();
    for (id, name) in USERS {
        directory.insert(UserProfile::new(UserId(*id), *name));
    }
    directory
}

// ---------------------------------------------------------------------------
// Server bootstrap
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let bind = std::env::var("DUELQUIZ_BIND")
        .unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    let server = DuelquizServerBuilder::new()
        .bind(&bind)
        .build(Arc::new(seed_catalog()), Arc::new(seed_directory()))
        .await?;
    tracing::info!(%bind, users = USERS.len(), "quiz server ready");

    server.run().await?;
    Ok(())
}
