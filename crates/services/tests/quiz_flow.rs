use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use quiz_core::model::{
    Difficulty, Gender, Profile, ProfileDraft, ResultTier, SessionState,
};
use quiz_core::time::fixed_clock;
use services::{
    AdvanceOutcome, AppServices, QuestionBank, QuestionCatalog, QuizLoopService, ScoreAggregator,
    SessionController, SessionError,
};
use storage::repository::{InMemoryProfileStore, ProfileStore, Storage, StorageError};

fn draft() -> ProfileDraft {
    ProfileDraft {
        name: "Marie Curie".into(),
        preferred_name: "Marie".into(),
        gender: Gender::Female,
        age: 66,
        avatar: None,
    }
}

fn correct_answer(session: &SessionController) -> String {
    session
        .current_question()
        .expect("session in progress")
        .correct_answer()
        .to_owned()
}

#[tokio::test]
async fn perfect_math_run_is_recorded_and_summarized() {
    let services = AppServices::in_memory(
        fixed_clock(),
        QuestionCatalog::builtin().unwrap(),
        Duration::ZERO,
    );
    services.profiles().register(draft()).await.unwrap();
    let quiz = services.quiz_loop();

    let mut session = quiz.start_session("math", "easy").unwrap();
    assert_eq!(session.total(), 10);
    let prompts: std::collections::HashSet<_> =
        session.questions().iter().map(|q| q.prompt().to_owned()).collect();
    assert_eq!(prompts.len(), 10);

    let outcome = loop {
        let answer = correct_answer(&session);
        quiz.submit_answer(&mut session, &answer).unwrap();
        match quiz.advance(&mut session).await.unwrap() {
            AdvanceOutcome::Next => {}
            other => break other,
        }
    };

    let AdvanceOutcome::Completed(outcome) = outcome else {
        panic!("expected completion");
    };
    assert_eq!(outcome.score, 10);
    assert_eq!(outcome.total, 10);
    assert_eq!(outcome.difficulty, Difficulty::Easy);
    assert_eq!(outcome.tier(), ResultTier::Excellent);
    assert_eq!(session.state(), SessionState::Completed);

    let profile = services.profiles().load().await.unwrap().unwrap();
    let math = profile.scores_for("math");
    assert_eq!(math.len(), 1);
    assert_eq!(math[0].score(), 10);
    assert_eq!(math[0].total(), 10);
    assert_eq!(math[0].difficulty(), Difficulty::Easy);

    let summary = services.profiles().summary().await.unwrap();
    assert_eq!(summary.count, 1);
    assert_eq!(summary.average_percent, 100);
}

#[tokio::test]
async fn unknown_category_is_filed_under_requested_key() {
    let services = AppServices::in_memory(
        fixed_clock(),
        QuestionCatalog::builtin().unwrap(),
        Duration::ZERO,
    );
    services.profiles().register(draft()).await.unwrap();
    let quiz = services.quiz_loop();

    let mut session = quiz.start_session("geography", "hard").unwrap();
    // Only ten science templates exist, so a hard session comes up short.
    assert_eq!(session.total(), 10);
    assert_eq!(quiz.bank().resolve_category("geography"), "science");

    while !session.is_complete() {
        quiz.submit_answer(&mut session, "not an option").unwrap();
        quiz.advance(&mut session).await.unwrap();
    }

    let profile = services.profiles().load().await.unwrap().unwrap();
    let geography = profile.scores_for("geography");
    assert_eq!(geography.len(), 1);
    assert_eq!(geography[0].score(), 0);
    assert_eq!(geography[0].difficulty(), Difficulty::Hard);
    assert!(profile.scores_for("science").is_empty());
}

#[tokio::test]
async fn history_survives_profile_edit_and_reload() {
    let storage = Storage::in_memory();
    let services = AppServices::from_storage(
        &storage,
        fixed_clock(),
        QuestionCatalog::builtin().unwrap(),
        Duration::ZERO,
    );
    services.profiles().register(draft()).await.unwrap();

    let aggregator = ScoreAggregator::new(fixed_clock());
    let profile = storage.profiles.load().await.unwrap().unwrap();
    let profile = aggregator
        .record_completion(profile, "math", Difficulty::Easy, 8, 10)
        .unwrap();
    let profile = aggregator
        .record_completion(profile, "science", Difficulty::Easy, 5, 10)
        .unwrap();
    storage.profiles.save(&profile).await.unwrap();

    let edited = services
        .profiles()
        .update(ProfileDraft {
            gender: Gender::Male,
            ..draft()
        })
        .await
        .unwrap();
    assert_eq!(edited.avatar(), Gender::Male.default_avatar());

    let summary = services.profiles().summary().await.unwrap();
    assert_eq!(summary.count, 2);
    assert_eq!(summary.average_percent, 65);
}

struct UnreachableStore;

#[async_trait]
impl ProfileStore for UnreachableStore {
    async fn load(&self) -> Result<Option<Profile>, StorageError> {
        Err(StorageError::Connection("store offline".into()))
    }

    async fn save(&self, _profile: &Profile) -> Result<(), StorageError> {
        Err(StorageError::Connection("store offline".into()))
    }
}

#[tokio::test]
async fn storage_failure_surfaces_but_session_completes() {
    let bank = Arc::new(QuestionBank::from_catalog(
        QuestionCatalog::builtin().unwrap(),
    ));
    let quiz = QuizLoopService::new(fixed_clock(), Arc::clone(&bank), Arc::new(UnreachableStore));

    let mut session = quiz.start_session("science", "easy").unwrap();
    let mut last = Ok(AdvanceOutcome::Next);
    while !session.is_complete() {
        let answer = correct_answer(&session);
        quiz.submit_answer(&mut session, &answer).unwrap();
        last = quiz.advance(&mut session).await;
    }

    assert!(matches!(last, Err(SessionError::Storage(_))));
    let outcome = session.outcome().expect("completed session has an outcome");
    assert_eq!(outcome.score, 10);

    // A later retry against a healthy store succeeds.
    let store = Arc::new(InMemoryProfileStore::new());
    store
        .save(&Profile::register(draft()).unwrap())
        .await
        .unwrap();
    let retry = QuizLoopService::new(fixed_clock(), bank, store.clone());
    let saved = retry.record_completion(&outcome).await.unwrap().unwrap();
    assert_eq!(saved.scores_for("science").len(), 1);
}
