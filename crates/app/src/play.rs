use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};

use quiz_core::model::{OptionMark, SessionOutcome};
use services::{AdvanceOutcome, AnswerFeedback, QuizLoopService, QuizRunner, SessionController};

type Input = Lines<BufReader<Stdin>>;

async fn prompt(input: &mut Input, text: &str) -> std::io::Result<Option<String>> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(text.as_bytes()).await?;
    stdout.flush().await?;
    input.next_line().await
}

fn print_question(session: &SessionController) {
    let Some(question) = session.current_question() else {
        return;
    };
    let progress = session.progress();
    println!();
    println!(
        "Question {}/{}  ({}% done, score {})",
        progress.current + 1,
        progress.total,
        progress.percent_complete,
        session.score()
    );
    println!("{}", question.prompt());
    for (index, option) in question.options().iter().enumerate() {
        println!("  {}. {option}", index + 1);
    }
}

fn print_feedback(options: &[String], feedback: &AnswerFeedback) {
    if feedback.is_correct {
        println!("Correct!");
    } else {
        println!("Not quite. The answer is: {}", feedback.correct_answer);
    }
    for option in options {
        let mark = OptionMark::classify(
            option,
            &feedback.correct_answer,
            Some(feedback.selected.as_str()),
            true,
        );
        let marker = match mark {
            OptionMark::Correct => "+",
            OptionMark::WrongSelection => "x",
            OptionMark::Neutral | OptionMark::Dimmed => " ",
        };
        println!("  [{marker}] {option}");
    }
    if let Some(explanation) = &feedback.explanation {
        println!("{explanation}");
    }
}

fn print_result(outcome: &SessionOutcome) {
    let tier = outcome.tier();
    println!();
    println!(
        "You scored {}/{} ({:.0}%).",
        outcome.score,
        outcome.total,
        outcome.percent()
    );
    if tier.celebrates() {
        println!("*** {} ***", tier.message());
    } else {
        println!("{}", tier.message());
    }
}

/// Pick an option from a 1-based number or the option text itself.
fn choose(options: &[String], raw: &str) -> Option<String> {
    let raw = raw.trim();
    if let Ok(number) = raw.parse::<usize>() {
        return number
            .checked_sub(1)
            .and_then(|index| options.get(index))
            .cloned();
    }
    options.iter().find(|option| option.as_str() == raw).cloned()
}

/// Run an interactive session on stdin/stdout until it ends or the player quits.
pub async fn run(
    service: QuizLoopService,
    session: SessionController,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut runner = QuizRunner::new(service, session);

    loop {
        let session = runner.session().await;
        let Some(question) = session.current_question() else {
            break;
        };
        print_question(&session);

        let Some(line) = prompt(&mut input, "Your answer (1-4, q to quit): ").await? else {
            break;
        };
        if line.trim().eq_ignore_ascii_case("q") {
            break;
        }
        let Some(answer) = choose(question.options(), &line) else {
            println!("Please pick one of the listed options.");
            continue;
        };

        let Some(feedback) = runner.submit_answer(&answer).await else {
            continue;
        };
        print_feedback(question.options(), &feedback);

        match runner.wait_for_advance().await {
            Some(Ok(AdvanceOutcome::Completed(outcome))) => {
                print_result(&outcome);
                let again = prompt(&mut input, "Try again with the same questions? [y/N] ").await?;
                if again.is_some_and(|answer| answer.trim().eq_ignore_ascii_case("y")) {
                    runner.restart().await;
                } else {
                    break;
                }
            }
            Some(Ok(_)) | None => {}
            Some(Err(err)) => return Err(err.into()),
        }
    }

    runner.teardown();
    Ok(())
}
