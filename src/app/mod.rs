//! The single-threaded event loop driving the surface, the session state
//! machine, and the record sink.

pub mod shutdown;
pub mod surface;

use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use tokio::io::AsyncBufRead;
use tracing::{error, info};

use crate::session::{Session, SessionRecord, Stage};
use crate::sink::RecordSink;
use crate::utils::clock::Clock;

use surface::{LineEvent, Submission, Surface};

const TICK_PERIOD: Duration = Duration::from_secs(1);

enum Flow {
    Continue,
    Exit,
}

/// Runs one complete session: form, stopwatch, reflection prompts, remote
/// append. Everything happens on the calling task; the only other task is
/// the interrupt watcher.
pub async fn run_app<R, W, S>(
    surface: &mut Surface<R, W>,
    sink: &S,
    clock: &dyn Clock,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
    S: RecordSink + ?Sized,
{
    let mut session = Session::new();
    surface.show_welcome()?;

    if let Flow::Exit = start_form(surface, &mut session, clock).await? {
        return Ok(());
    }
    if let Flow::Exit = run_stopwatch(surface, &mut session, clock).await? {
        return Ok(());
    }
    let Some(record) = prompt_flow(surface, &mut session).await? else {
        return Ok(());
    };
    submit_record(surface, sink, record).await
}

/// Collects category and objectives until the session starts. Failing
/// validation reports the problem and re-runs the form.
async fn start_form<R, W>(
    surface: &mut Surface<R, W>,
    session: &mut Session,
    clock: &dyn Clock,
) -> Result<Flow>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    while session.stage() == Stage::Idle {
        let category = match surface.select_category().await? {
            Submission::Text(text) => text,
            Submission::Interrupted => {
                if confirm_exit(surface).await? {
                    return Ok(Flow::Exit);
                }
                continue;
            }
            Submission::Eof => return Ok(Flow::Exit),
        };
        let objectives = match surface
            .read_block("What are my objectives for this session?")
            .await?
        {
            Submission::Text(text) => text,
            Submission::Interrupted => {
                if confirm_exit(surface).await? {
                    return Ok(Flow::Exit);
                }
                continue;
            }
            Submission::Eof => return Ok(Flow::Exit),
        };
        match session.start(&category, &objectives, clock.now()) {
            Ok(()) => {
                info!("Session started in category {:?}", category);
                surface.show_session_started()?;
            }
            Err(e) => surface.show_error(&e.to_string())?,
        }
    }
    Ok(Flow::Continue)
}

/// Ticks the stopwatch on a fixed cadence until the user ends the session.
/// Ticks are only delivered while this loop runs, so the elapsed counter
/// freezes the moment the stage leaves `Active`.
async fn run_stopwatch<R, W>(
    surface: &mut Surface<R, W>,
    session: &mut Session,
    clock: &dyn Clock,
) -> Result<Flow>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut tick_point = clock.instant() + TICK_PERIOD;
    while session.stage() == Stage::Active {
        tokio::select! {
            _ = clock.sleep_until(tick_point) => {
                tick_point += TICK_PERIOD;
                let elapsed = session.tick();
                surface.render_stopwatch(elapsed)?;
            }
            read = surface.read_line() => match read? {
                LineEvent::Line(_) => {
                    session.stop(clock.now());
                    info!("Session stopped after {}s", session.elapsed_seconds());
                    surface.show_session_ended(session.elapsed_seconds())?;
                }
                LineEvent::Interrupted => {
                    if confirm_exit(surface).await? {
                        return Ok(Flow::Exit);
                    }
                }
                LineEvent::Eof => return Ok(Flow::Exit),
            },
        }
    }
    Ok(Flow::Continue)
}

/// Walks the reflection prompts in order; the pending prompt is derived from
/// the session stage. Returns the finished record once both answers are in.
async fn prompt_flow<R, W>(
    surface: &mut Surface<R, W>,
    session: &mut Session,
) -> Result<Option<SessionRecord>>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    while let Some(prompt) = session.pending_prompt() {
        match surface.prompt_block(prompt.title()).await? {
            Submission::Text(text) => {
                if let Some(record) = session.submit_prompt(&text) {
                    return Ok(Some(record));
                }
            }
            Submission::Interrupted => {
                if confirm_exit(surface).await? {
                    return Ok(None);
                }
            }
            Submission::Eof => return Ok(None),
        }
    }
    Ok(None)
}

/// The single remote append of the run. The loop blocks on it; success and
/// failure are both reported and the in-memory session is gone either way.
async fn submit_record<R, W, S>(
    surface: &mut Surface<R, W>,
    sink: &S,
    record: SessionRecord,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
    S: RecordSink + ?Sized,
{
    match sink.append(record.to_row()).await {
        Ok(()) => {
            info!("Session logged");
            surface.show_notice("Your session has been logged.")?;
        }
        Err(e) => {
            error!("Failed to log session {e:?}");
            surface.show_error(&format!(
                "An error occurred while logging the session: {e}"
            ))?;
        }
    }
    Ok(())
}

/// Confirmation for Ctrl-C. Declining re-arms a fresh interrupt watcher so a
/// later Ctrl-C asks again.
async fn confirm_exit<R, W>(surface: &mut Surface<R, W>) -> Result<bool>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    if surface.confirm_exit().await? {
        info!("Exiting on user request, dropping the session");
        return Ok(true);
    }
    surface.rearm_shutdown(shutdown::armed_shutdown_token());
    Ok(false)
}

#[cfg(test)]
mod app_tests {
    use std::time::Duration;

    use anyhow::Result;
    use async_trait::async_trait;
    use chrono::{DateTime, Local, TimeZone};
    use tokio::io::{AsyncWriteExt, BufReader};
    use tokio::time::Instant;
    use tokio_util::sync::CancellationToken;

    use crate::{
        app::{run_app, surface::Surface},
        sink::MockRecordSink,
        utils::{clock::Clock, logging::TEST_LOGGING},
    };

    struct TestClock {
        start_time: DateTime<Local>,
    }

    impl TestClock {
        fn new() -> Self {
            Self {
                start_time: Local.with_ymd_and_hms(2024, 1, 5, 13, 5, 9).unwrap(),
            }
        }
    }

    #[async_trait]
    impl Clock for TestClock {
        fn now(&self) -> DateTime<Local> {
            self.start_time
        }

        fn instant(&self) -> Instant {
            Instant::now()
        }

        async fn sleep_until(&self, instant: Instant) {
            tokio::time::sleep_until(instant).await;
        }
    }

    fn scripted(input: &'static str) -> Surface<BufReader<&'static [u8]>, Vec<u8>> {
        Surface::new(
            BufReader::new(input.as_bytes()),
            Vec::new(),
            CancellationToken::new(),
        )
    }

    #[tokio::test]
    async fn full_session_is_logged_once() -> Result<()> {
        *TEST_LOGGING;
        let mut surface = scripted(
            "3\nRead the async book\n\n\nLearned about pinning\n\nNone\n\n",
        );

        let mut sink = MockRecordSink::new();
        sink.expect_append()
            .withf(|row| {
                row.cells()
                    == &[
                        "01/05/2024".to_owned(),
                        "01:05:09 PM".to_owned(),
                        "01:05:09 PM".to_owned(),
                        "0:00:00".to_owned(),
                        "Web Development".to_owned(),
                        "Read the async book".to_owned(),
                        "Learned about pinning".to_owned(),
                        "None".to_owned(),
                    ]
            })
            .times(1)
            .returning(|_| Ok(()));

        run_app(&mut surface, &sink, &TestClock::new()).await?;

        let shown = String::from_utf8_lossy(surface.output()).to_string();
        assert!(shown.contains("Your session has been logged."));
        Ok(())
    }

    #[tokio::test]
    async fn invalid_start_is_reported_and_retried() -> Result<()> {
        *TEST_LOGGING;
        // First pass: empty category and objectives. Second pass succeeds.
        let mut surface = scripted("\n\n1\nShip the refactor\n\n\nok\n\n\n\n");

        let mut sink = MockRecordSink::new();
        sink.expect_append()
            .withf(|row| row.cells()[4] == "Software Architecture")
            .times(1)
            .returning(|_| Ok(()));

        run_app(&mut surface, &sink, &TestClock::new()).await?;

        let shown = String::from_utf8_lossy(surface.output()).to_string();
        assert!(shown.contains("please choose a category"));
        Ok(())
    }

    #[tokio::test]
    async fn closed_input_drops_the_session() -> Result<()> {
        *TEST_LOGGING;
        let mut surface = scripted("2\nTrain a toy model\n");

        let mut sink = MockRecordSink::new();
        sink.expect_append().times(0);

        run_app(&mut surface, &sink, &TestClock::new()).await?;
        Ok(())
    }

    #[tokio::test]
    async fn confirmed_interrupt_drops_the_session() -> Result<()> {
        *TEST_LOGGING;
        let token = CancellationToken::new();
        token.cancel();
        let mut surface = Surface::new(BufReader::new(&b"y\n"[..]), Vec::new(), token);

        let mut sink = MockRecordSink::new();
        sink.expect_append().times(0);

        run_app(&mut surface, &sink, &TestClock::new()).await?;

        let shown = String::from_utf8_lossy(surface.output()).to_string();
        assert!(shown.contains("Do you really want to exit?"));
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn stopwatch_counts_delivered_ticks() -> Result<()> {
        *TEST_LOGGING;
        let (script, input) = tokio::io::duplex(256);
        let mut surface = Surface::new(BufReader::new(input), Vec::new(), CancellationToken::new());

        tokio::spawn(async move {
            let mut script = script;
            script.write_all(b"1\nDeep work\n\n").await.unwrap();
            tokio::time::sleep(Duration::from_millis(3500)).await;
            script.write_all(b"\nDone\n\n\n\n").await.unwrap();
        });

        let mut sink = MockRecordSink::new();
        sink.expect_append()
            .withf(|row| row.cells()[6] == "Done" && row.cells()[3] == "0:00:00")
            .times(1)
            .returning(|_| Ok(()));

        run_app(&mut surface, &sink, &TestClock::new()).await?;

        let shown = String::from_utf8_lossy(surface.output()).to_string();
        assert!(shown.contains("00:03"));
        assert!(!shown.contains("00:04"));
        Ok(())
    }
}
