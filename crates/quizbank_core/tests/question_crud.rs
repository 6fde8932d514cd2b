use quizbank_core::db::migrations::latest_version;
use quizbank_core::db::open_db_in_memory;
use quizbank_core::{
    Question, QuestionOption, QuestionRepository, QuestionService, RepoError,
    SqliteQuestionRepository,
};
use rusqlite::Connection;

fn capital_of_france() -> Question {
    Question::new(
        "Capital of France?",
        vec![
            QuestionOption::new("Paris", true),
            QuestionOption::new("Lyon", false),
            QuestionOption::new("Nice", false),
        ],
    )
}

fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

#[test]
fn list_on_empty_store_returns_empty_vec() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteQuestionRepository::try_new(&mut conn).unwrap();

    assert!(repo.list_questions().unwrap().is_empty());
}

#[test]
fn create_then_list_roundtrip_keeps_option_order() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteQuestionRepository::try_new(&mut conn).unwrap();

    let question = capital_of_france();
    let id = repo.create_question(&question).unwrap();
    assert!(id > 0);

    let listed = repo.list_questions().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, id);
    assert_eq!(listed[0].body, "Capital of France?");
    assert_eq!(listed[0].options, question.options);
    assert!(listed[0].options[0].correct);
    assert_eq!(listed[0].correct_options().count(), 1);
}

#[test]
fn create_ignores_caller_supplied_id() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteQuestionRepository::try_new(&mut conn).unwrap();

    let mut question = capital_of_france();
    question.id = 42;
    let id = repo.create_question(&question).unwrap();

    assert_eq!(id, 1);
    assert!(repo.get_question(42).unwrap().is_none());
}

#[test]
fn list_returns_each_question_with_only_its_own_options() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteQuestionRepository::try_new(&mut conn).unwrap();

    let first = repo.create_question(&capital_of_france()).unwrap();
    let second = repo
        .create_question(&Question::new(
            "2 + 2?",
            vec![QuestionOption::new("4", true), QuestionOption::new("5", false)],
        ))
        .unwrap();
    let third = repo
        .create_question(&Question::new("No options yet", Vec::new()))
        .unwrap();

    let listed = repo.list_questions().unwrap();
    let ids: Vec<_> = listed.iter().map(|question| question.id).collect();
    assert_eq!(ids, vec![first, second, third]);
    assert_eq!(listed[0].options.len(), 3);
    assert_eq!(listed[1].options[0].body, "4");
    assert!(listed[2].options.is_empty());
}

#[test]
fn update_replaces_body_and_full_option_set() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteQuestionRepository::try_new(&mut conn).unwrap();
    let id = repo.create_question(&capital_of_france()).unwrap();

    let replacement = Question::new(
        "Q2",
        vec![QuestionOption::new("A", false), QuestionOption::new("B", true)],
    );
    repo.update_question(id, &replacement).unwrap();

    let loaded = repo.get_question(id).unwrap().unwrap();
    assert_eq!(loaded.body, "Q2");
    assert_eq!(loaded.options, replacement.options);
}

#[test]
fn consecutive_updates_leave_only_last_option_set() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteQuestionRepository::try_new(&mut conn).unwrap();
    let id = repo.create_question(&capital_of_france()).unwrap();

    let q1 = Question::new(
        "v1",
        vec![
            QuestionOption::new("one", true),
            QuestionOption::new("two", false),
            QuestionOption::new("three", false),
            QuestionOption::new("four", false),
        ],
    );
    let q2 = Question::new("v2", vec![QuestionOption::new("only", true)]);
    repo.update_question(id, &q1).unwrap();
    repo.update_question(id, &q2).unwrap();

    let listed = repo.list_questions().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].body, "v2");
    assert_eq!(listed[0].options, q2.options);
    drop(repo);
    assert_eq!(count_rows(&conn, "options"), 1);
}

#[test]
fn update_missing_question_returns_not_found_and_writes_nothing() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteQuestionRepository::try_new(&mut conn).unwrap();

    let err = repo
        .update_question(7, &capital_of_france())
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(7)));

    drop(repo);
    assert_eq!(count_rows(&conn, "questions"), 0);
    assert_eq!(count_rows(&conn, "options"), 0);
}

#[test]
fn delete_removes_question_and_all_its_options() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteQuestionRepository::try_new(&mut conn).unwrap();
    let doomed = repo.create_question(&capital_of_france()).unwrap();
    let kept = repo
        .create_question(&Question::new(
            "Stays",
            vec![QuestionOption::new("yes", true)],
        ))
        .unwrap();

    repo.delete_question(doomed).unwrap();

    let listed = repo.list_questions().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, kept);
    assert!(repo.get_question(doomed).unwrap().is_none());
    drop(repo);

    let orphaned: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM options WHERE question_id = ?1;",
            [doomed],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(orphaned, 0);
}

#[test]
fn delete_is_idempotent() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteQuestionRepository::try_new(&mut conn).unwrap();
    let id = repo.create_question(&capital_of_france()).unwrap();

    repo.delete_question(id).unwrap();
    repo.delete_question(id).unwrap();
    repo.delete_question(999).unwrap();

    assert!(repo.list_questions().unwrap().is_empty());
}

#[test]
fn failed_option_insert_rolls_back_whole_create() {
    let mut conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TRIGGER reject_poisoned_option
         BEFORE INSERT ON options
         WHEN NEW.body = 'poison'
         BEGIN
            SELECT RAISE(ABORT, 'poisoned option');
         END;",
    )
    .unwrap();
    let mut repo = SqliteQuestionRepository::try_new(&mut conn).unwrap();

    let question = Question::new(
        "Half written?",
        vec![
            QuestionOption::new("fine", true),
            QuestionOption::new("poison", false),
        ],
    );
    let err = repo.create_question(&question).unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
    assert!(err.to_string().contains("poisoned option"));

    assert!(repo.list_questions().unwrap().is_empty());
    drop(repo);
    assert_eq!(count_rows(&conn, "questions"), 0);
    assert_eq!(count_rows(&conn, "options"), 0);
}

#[test]
fn failed_option_insert_rolls_back_whole_update() {
    let mut conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TRIGGER reject_poisoned_option
         BEFORE INSERT ON options
         WHEN NEW.body = 'poison'
         BEGIN
            SELECT RAISE(ABORT, 'poisoned option');
         END;",
    )
    .unwrap();
    let mut repo = SqliteQuestionRepository::try_new(&mut conn).unwrap();
    let original = capital_of_france();
    let id = repo.create_question(&original).unwrap();

    let broken = Question::new("Rewritten", vec![QuestionOption::new("poison", true)]);
    repo.update_question(id, &broken).unwrap_err();

    let loaded = repo.get_question(id).unwrap().unwrap();
    assert_eq!(loaded.body, original.body);
    assert_eq!(loaded.options, original.options);
}

#[test]
fn failed_question_delete_rolls_back_option_delete() {
    let mut conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TRIGGER protect_questions
         BEFORE DELETE ON questions
         BEGIN
            SELECT RAISE(ABORT, 'question is protected');
         END;",
    )
    .unwrap();
    let mut repo = SqliteQuestionRepository::try_new(&mut conn).unwrap();
    let original = capital_of_france();
    let id = repo.create_question(&original).unwrap();

    let err = repo.delete_question(id).unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
    assert!(err.to_string().contains("question is protected"));

    let loaded = repo.get_question(id).unwrap().unwrap();
    assert_eq!(loaded.body, original.body);
    assert_eq!(loaded.options, original.options);
}

#[test]
fn corrupt_correct_flag_is_reported_as_invalid_data() {
    let mut conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO questions (body) VALUES ('Broken');
         INSERT INTO options (question_id, body, correct) VALUES (1, 'odd', 2);",
    )
    .unwrap();
    let repo = SqliteQuestionRepository::try_new(&mut conn).unwrap();

    let err = repo.list_questions().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn rows_written_outside_the_repository_are_visible_on_list() {
    let mut conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO questions (body) VALUES ('Test Question 1');
         INSERT INTO options (question_id, body, correct) VALUES (1, 'Option 1', true);
         INSERT INTO options (question_id, body, correct) VALUES (1, 'Option 2', false);
         INSERT INTO options (question_id, body, correct) VALUES (1, 'Option 3', false);",
    )
    .unwrap();
    let repo = SqliteQuestionRepository::try_new(&mut conn).unwrap();

    let listed = repo.list_questions().unwrap();
    assert_eq!(listed.len(), 1);
    let bodies: Vec<_> = listed[0]
        .options
        .iter()
        .map(|option| option.body.as_str())
        .collect();
    assert_eq!(bodies, vec!["Option 1", "Option 2", "Option 3"]);
}

#[test]
fn service_wraps_repository_calls() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteQuestionRepository::try_new(&mut conn).unwrap();
    let mut service = QuestionService::new(repo);

    let id = service.create_question(&capital_of_france()).unwrap();
    assert_eq!(service.list_questions().unwrap().len(), 1);

    service
        .update_question(id, &Question::new("Renamed", Vec::new()))
        .unwrap();
    let loaded = service.get_question(id).unwrap().unwrap();
    assert_eq!(loaded.body, "Renamed");
    assert!(service.get_question(id + 1).unwrap().is_none());
    assert!(loaded.options.is_empty());

    let err = service
        .update_question(id + 1, &capital_of_france())
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));

    service.delete_question(id).unwrap();
    assert!(service.list_questions().unwrap().is_empty());
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let mut conn = Connection::open_in_memory().unwrap();

    match SqliteQuestionRepository::try_new(&mut conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_required_tables() {
    let mut conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteQuestionRepository::try_new(&mut conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("questions"))
    ));
}
