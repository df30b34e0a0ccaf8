use async_trait::async_trait;
use rusqlite::Connection;
use sql_insights::config::InsightsConfig;
use sql_insights::error::{InsightsError, Result};
use sql_insights::executor::{CellValue, QueryOutcome};
use sql_insights::llm::LanguageModel;
use sql_insights::pipeline::InsightsPipeline;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Stub oracle that replays canned completions and counts calls.
struct StubModel {
    replies: Mutex<VecDeque<Result<String>>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl StubModel {
    fn new(replies: Vec<Result<String>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn prompt(&self, idx: usize) -> String {
        self.calls.lock().unwrap()[idx].0.clone()
    }

    fn question(&self, idx: usize) -> String {
        self.calls.lock().unwrap()[idx].1.clone()
    }
}

#[async_trait]
impl LanguageModel for StubModel {
    async fn complete(&self, system_prompt: &str, question: &str) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((system_prompt.to_string(), question.to_string()));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(InsightsError::Generation("no more replies".to_string())))
    }

    fn name(&self) -> &str {
        "stub"
    }
}

fn create_employee_db(dir: &Path) -> PathBuf {
    let path = dir.join("employee_kpi.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE EMPLOYEE (ID INTEGER PRIMARY KEY, NAME TEXT, DEPARTMENT TEXT, SALARY INTEGER);
         INSERT INTO EMPLOYEE VALUES (1, 'Ana', 'Sales', 40000);
         INSERT INTO EMPLOYEE VALUES (2, 'Bo', 'Sales', 60000);
         INSERT INTO EMPLOYEE VALUES (3, 'Cy', 'Engineering', 90000);",
    )
    .unwrap();
    path
}

fn pipeline_for(db_path: &Path, model: Arc<StubModel>) -> InsightsPipeline {
    let config = InsightsConfig::default().with_db_path(db_path);
    InsightsPipeline::new(&config, model)
}

#[tokio::test]
async fn test_average_salary_end_to_end() {
    let dir = TempDir::new().unwrap();
    let db = create_employee_db(dir.path());
    let model = StubModel::new(vec![Ok(
        "```sql\nSELECT AVG(SALARY) FROM EMPLOYEE WHERE DEPARTMENT='Sales';\n```".to_string(),
    )]);
    let pipeline = pipeline_for(&db, model.clone());

    let answer = pipeline.ask("average salary in Sales").await.unwrap();

    assert_eq!(answer.sql, "SELECT AVG(SALARY) FROM EMPLOYEE WHERE DEPARTMENT='Sales';");
    assert!(!answer.regenerated);
    assert_eq!(model.call_count(), 1);
    match answer.outcome {
        QueryOutcome::Rows(rs) => {
            assert_eq!(rs.rows.len(), 1);
            assert_eq!(rs.rows[0][0], CellValue::Real(50000.0));
        }
        other => panic!("expected one row, got {:?}", other),
    }
}

#[tokio::test]
async fn test_question_reaches_model_verbatim() {
    let dir = TempDir::new().unwrap();
    let db = create_employee_db(dir.path());
    let model = StubModel::new(vec![
        Ok("SELECT * FROM STAFF;".to_string()),
        Ok("SELECT AVG(SALARY) FROM EMPLOYEE;".to_string()),
    ]);
    let pipeline = pipeline_for(&db, model.clone());
    let question = "  average salary in Sales \n";

    let answer = pipeline.ask(question).await.unwrap();

    assert_eq!(model.call_count(), 2);
    assert_eq!(model.question(0), question);
    assert_eq!(model.question(1), question);
    assert_eq!(answer.question, question);
}

#[tokio::test]
async fn test_unknown_table_regenerates_once() {
    let dir = TempDir::new().unwrap();
    let db = create_employee_db(dir.path());
    let model = StubModel::new(vec![
        Ok("SELECT * FROM STAFF;".to_string()),
        Ok("SELECT NAME FROM EMPLOYEE WHERE DEPARTMENT = 'Engineering';".to_string()),
    ]);
    let pipeline = pipeline_for(&db, model.clone());

    let answer = pipeline.ask("who works in engineering").await.unwrap();

    assert_eq!(model.call_count(), 2);
    assert!(answer.regenerated);
    assert!(model.prompt(1).contains("The ONLY valid tables are: EMPLOYEE."));
    assert_eq!(answer.outcome.row_count(), 1);
}

#[tokio::test]
async fn test_still_invalid_after_regeneration_surfaces_as_execution_failure() {
    let dir = TempDir::new().unwrap();
    let db = create_employee_db(dir.path());
    let model = StubModel::new(vec![
        Ok("SELECT * FROM STAFF;".to_string()),
        Ok("SELECT * FROM STAFF_MEMBERS;".to_string()),
    ]);
    let pipeline = pipeline_for(&db, model.clone());

    let answer = pipeline.ask("list staff").await.unwrap();

    assert_eq!(model.call_count(), 2);
    assert_eq!(answer.sql, "SELECT * FROM STAFF_MEMBERS;");
    assert!(answer.outcome.is_failure());
}

#[tokio::test]
async fn test_empty_result_is_not_a_failure() {
    let dir = TempDir::new().unwrap();
    let db = create_employee_db(dir.path());
    let model = StubModel::new(vec![Ok("SELECT * FROM EMPLOYEE WHERE DEPARTMENT = 'Legal';".to_string())]);
    let pipeline = pipeline_for(&db, model);

    let answer = pipeline.ask("who works in legal").await.unwrap();

    assert!(matches!(answer.outcome, QueryOutcome::Empty { .. }));
}

#[tokio::test]
async fn test_hallucinated_column_is_contained() {
    let dir = TempDir::new().unwrap();
    let db = create_employee_db(dir.path());
    let model = StubModel::new(vec![Ok("SELECT BONUS FROM EMPLOYEE;".to_string())]);
    let pipeline = pipeline_for(&db, model.clone());

    let answer = pipeline.ask("bonus per employee").await.unwrap();

    assert_eq!(model.call_count(), 1);
    match answer.outcome {
        QueryOutcome::Failed(failure) => assert!(failure.message.contains("BONUS")),
        other => panic!("expected failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_database_fails_before_generation() {
    let dir = TempDir::new().unwrap();
    let model = StubModel::new(vec![Ok("SELECT 1;".to_string())]);
    let pipeline = pipeline_for(&dir.path().join("absent.db"), model.clone());

    let err = pipeline.ask("anything").await.unwrap_err();

    assert!(matches!(err, InsightsError::SchemaUnavailable(_)));
    assert_eq!(model.call_count(), 0);
}

#[tokio::test]
async fn test_initial_generation_failure_is_fatal() {
    let dir = TempDir::new().unwrap();
    let db = create_employee_db(dir.path());
    let model = StubModel::new(vec![Err(InsightsError::Generation("quota exceeded".to_string()))]);
    let pipeline = pipeline_for(&db, model.clone());

    let err = pipeline.ask("average salary").await.unwrap_err();

    assert!(matches!(err, InsightsError::Generation(_)));
    assert_eq!(model.call_count(), 1);
}

#[tokio::test]
async fn test_blank_completion_and_blank_question() {
    let dir = TempDir::new().unwrap();
    let db = create_employee_db(dir.path());
    let model = StubModel::new(vec![Ok("```sql\n```".to_string())]);
    let pipeline = pipeline_for(&db, model.clone());

    assert!(matches!(pipeline.ask("   ").await, Err(InsightsError::Generation(_))));
    assert_eq!(model.call_count(), 0);

    assert!(matches!(pipeline.ask("anything").await, Err(InsightsError::Generation(_))));
    assert_eq!(model.call_count(), 1);
}

#[tokio::test]
async fn test_regeneration_oracle_failure_executes_initial_query() {
    let dir = TempDir::new().unwrap();
    let db = create_employee_db(dir.path());
    let model = StubModel::new(vec![
        Ok("SELECT * FROM STAFF;".to_string()),
        Err(InsightsError::Generation("timeout".to_string())),
    ]);
    let pipeline = pipeline_for(&db, model.clone());

    let answer = pipeline.ask("list staff").await.unwrap();

    assert_eq!(model.call_count(), 2);
    assert!(!answer.regenerated);
    assert_eq!(answer.sql, "SELECT * FROM STAFF;");
    assert!(answer.outcome.is_failure());
}

#[tokio::test]
async fn test_pipeline_against_seeded_movies() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("movies.db");
    sql_insights::seed::seed_movies(&db, &Default::default()).unwrap();

    let model = StubModel::new(vec![Ok(
        "SQL Query: SELECT GENRE, COUNT(*) FROM MOVIES GROUP BY GENRE;".to_string(),
    )]);
    let pipeline = pipeline_for(&db, model.clone());

    let answer = pipeline.ask("how many movies per genre").await.unwrap();

    assert!(model.prompt(0).contains("- MOVIE_ACTORS(MOVIE_ID, ACTOR_ID, ROLE)"));
    assert!(answer.outcome.row_count() > 0);
}
