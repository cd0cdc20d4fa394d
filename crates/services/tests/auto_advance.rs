use std::sync::Arc;
use std::time::Duration;

use quiz_core::model::{Difficulty, Gender, Profile, ProfileDraft, QuestionDraft, QuestionId};
use quiz_core::model::SessionState;
use quiz_core::time::{fixed_clock, fixed_now};
use services::{
    AdvanceOutcome, DEFAULT_ADVANCE_DELAY, QuestionBank, QuestionCatalog, QuizLoopService,
    QuizRunner, SessionController,
};
use storage::repository::{InMemoryProfileStore, ProfileStore};

async fn registered_store() -> Arc<InMemoryProfileStore> {
    let store = Arc::new(InMemoryProfileStore::new());
    let profile = Profile::register(ProfileDraft {
        name: "Katherine Johnson".into(),
        preferred_name: "Katherine".into(),
        gender: Gender::Female,
        age: 101,
        avatar: None,
    })
    .unwrap();
    store.save(&profile).await.unwrap();
    store
}

fn service(store: Arc<InMemoryProfileStore>) -> QuizLoopService {
    let bank = Arc::new(QuestionBank::from_catalog(
        QuestionCatalog::builtin().unwrap(),
    ));
    QuizLoopService::new(fixed_clock(), bank, store)
}

fn single_question_session() -> SessionController {
    let question = QuestionDraft {
        prompt: "What is 6 x 7?".into(),
        options: vec!["42".into(), "36".into(), "48".into(), "49".into()],
        correct_answer: "42".into(),
        explanation: None,
    }
    .validate()
    .unwrap()
    .assign_id(QuestionId::new(1));
    SessionController::new("math", Difficulty::Easy, vec![question], fixed_now()).unwrap()
}

async fn current_answer(runner: &QuizRunner) -> String {
    runner
        .session()
        .await
        .current_question()
        .unwrap()
        .correct_answer()
        .to_owned()
}

#[tokio::test(start_paused = true)]
async fn advance_fires_after_delay() {
    let service = service(registered_store().await);
    assert_eq!(service.advance_delay(), DEFAULT_ADVANCE_DELAY);
    let session = service.start_session("math", "easy").unwrap();
    let mut runner = QuizRunner::new(service, session);

    let answer = current_answer(&runner).await;
    assert!(runner.submit_answer(&answer).await.unwrap().is_correct);
    assert!(runner.submit_answer("duplicate").await.is_none());

    tokio::time::sleep(Duration::from_millis(1499)).await;
    let snapshot = runner.session().await;
    assert_eq!(snapshot.state(), SessionState::Answered);
    assert_eq!(snapshot.current_index(), 0);
    assert!(runner.has_pending_advance());

    let outcome = runner.wait_for_advance().await.unwrap().unwrap();
    assert_eq!(outcome, AdvanceOutcome::Next);
    let snapshot = runner.session().await;
    assert_eq!(snapshot.state(), SessionState::Unanswered);
    assert_eq!(snapshot.current_index(), 1);
    assert_eq!(snapshot.score(), 1);
}

#[tokio::test(start_paused = true)]
async fn full_run_persists_through_runner() {
    let store = registered_store().await;
    let session = service(store.clone()).start_session("math", "easy").unwrap();
    let mut runner = QuizRunner::new(service(store.clone()), session);

    let mut last = None;
    for _ in 0..10 {
        let answer = current_answer(&runner).await;
        runner.submit_answer(&answer).await.unwrap();
        last = runner.wait_for_advance().await;
    }

    let Some(Ok(AdvanceOutcome::Completed(outcome))) = last else {
        panic!("expected completion");
    };
    assert_eq!(outcome.score, 10);

    let profile = store.load().await.unwrap().unwrap();
    assert_eq!(profile.scores_for("math").len(), 1);

    assert!(runner.restart().await);
    let replay = runner.session().await;
    assert_eq!(replay.state(), SessionState::Unanswered);
    assert_eq!(replay.score(), 0);
}

#[tokio::test(start_paused = true)]
async fn early_restart_keeps_scheduled_advance() {
    let service = service(registered_store().await);
    let session = service.start_session("math", "easy").unwrap();
    let mut runner = QuizRunner::new(service, session);

    let answer = current_answer(&runner).await;
    runner.submit_answer(&answer).await.unwrap();
    assert!(!runner.restart().await);
    assert!(runner.has_pending_advance());

    tokio::time::sleep(Duration::from_secs(10)).await;
    let snapshot = runner.session().await;
    assert_eq!(snapshot.state(), SessionState::Unanswered);
    assert_eq!(snapshot.current_index(), 1);
    assert_eq!(snapshot.score(), 1);

    let answer = current_answer(&runner).await;
    assert!(runner.submit_answer(&answer).await.is_some());
}

#[tokio::test(start_paused = true)]
async fn cancelled_advance_never_fires() {
    let service = service(registered_store().await);
    let session = service.start_session("science", "easy").unwrap();
    let mut runner = QuizRunner::new(service, session);

    runner.submit_answer("wrong on purpose").await.unwrap();
    assert!(runner.cancel_pending());
    assert!(!runner.cancel_pending());

    tokio::time::sleep(Duration::from_secs(5)).await;
    let snapshot = runner.session().await;
    assert_eq!(snapshot.state(), SessionState::Answered);
    assert_eq!(snapshot.current_index(), 0);
    assert!(runner.wait_for_advance().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn teardown_discards_pending_completion() {
    let store = registered_store().await;
    let mut runner = QuizRunner::new(service(store.clone()), single_question_session());

    runner.submit_answer("42").await.unwrap();
    runner.teardown();

    tokio::time::sleep(Duration::from_secs(5)).await;
    let profile = store.load().await.unwrap().unwrap();
    assert!(profile.scores_for("math").is_empty());
}

#[tokio::test(start_paused = true)]
async fn custom_delay_is_honored() {
    let store = registered_store().await;
    let service = service(store.clone()).with_advance_delay(Duration::from_millis(200));
    let mut runner = QuizRunner::new(service, single_question_session());

    runner.submit_answer("42").await.unwrap();
    tokio::time::sleep(Duration::from_millis(250)).await;
    assert!(runner.session().await.is_complete());

    let profile = store.load().await.unwrap().unwrap();
    assert_eq!(profile.scores_for("math")[0].score(), 1);
}
