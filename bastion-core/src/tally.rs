use std::future::Future;

use tracing::warn;

use crate::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Done,
    /// Nothing to do for this item (e.g. the member already has the role).
    Skipped,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tally {
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl Tally {
    pub fn attempted(&self) -> usize {
        self.succeeded + self.skipped + self.failed
    }

    fn record(mut self, step: Result<Step, Error>, index: usize) -> Self {
        match step {
            Ok(Step::Done) => self.succeeded += 1,
            Ok(Step::Skipped) => self.skipped += 1,
            Err(source) => {
                warn!(?source, index, "bulk step failed");
                self.failed += 1;
            }
        }
        self
    }
}

/// Run `op` on every item, one at a time, counting outcomes. A failing item
/// never stops the remaining ones.
pub async fn tally_sequential<I, T, F, Fut>(items: I, mut op: F) -> Tally
where
    I: IntoIterator<Item = T>,
    F: FnMut(T) -> Fut,
    Fut: Future<Output = Result<Step, Error>>,
{
    let mut tally = Tally::default();
    for (index, item) in items.into_iter().enumerate() {
        let step = op(item).await;
        tally = tally.record(step, index);
    }
    tally
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::{Step, Tally, tally_sequential};

    #[tokio::test]
    async fn failures_are_counted_and_never_abort() {
        let attempts = AtomicUsize::new(0);
        let members: Vec<u64> = (1..=10).collect();

        let tally = tally_sequential(members, |member| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if member % 3 == 0 {
                    Err(anyhow::anyhow!("Missing Access"))
                } else {
                    Ok(Step::Done)
                }
            }
        })
        .await;

        assert_eq!(attempts.load(Ordering::SeqCst), 10);
        assert_eq!(
            tally,
            Tally {
                succeeded: 7,
                skipped: 0,
                failed: 3
            }
        );
        assert_eq!(tally.attempted(), 10);
    }

    #[tokio::test]
    async fn first_item_failing_still_processes_the_rest() {
        let tally = tally_sequential([true, false, false], |fails| async move {
            if fails {
                Err(anyhow::anyhow!("boom"))
            } else {
                Ok(Step::Done)
            }
        })
        .await;

        assert_eq!(tally.succeeded, 2);
        assert_eq!(tally.failed, 1);
    }

    #[tokio::test]
    async fn skipped_items_are_neither_success_nor_failure() {
        let tally = tally_sequential([true, false, true], |has_role| async move {
            Ok(if has_role { Step::Skipped } else { Step::Done })
        })
        .await;

        assert_eq!(
            tally,
            Tally {
                succeeded: 1,
                skipped: 2,
                failed: 0
            }
        );
    }

    #[tokio::test]
    async fn empty_input_is_an_empty_tally() {
        let tally = tally_sequential(Vec::<u64>::new(), |_| async { Ok(Step::Done) }).await;
        assert_eq!(tally, Tally::default());
    }
}
