use crate::schedulers::{preempt_or_retain, Preemption};
use crate::{Context, Pid, Scheduler};

/// First come, first served. The running process keeps the CPU until it
/// finishes or blocks.
#[derive(Debug, Default, Copy, Clone)]
pub struct Fifo;

impl Scheduler for Fifo {
    fn name(&self) -> &'static str {
        "FIFO"
    }

    fn schedule(&mut self, ctx: &mut Context) -> Option<Pid> {
        preempt_or_retain(ctx, Preemption::Never).or_else(|| ctx.take_ready_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedulers::test_support::trace;
    use pretty_assertions::assert_eq;

    #[test]
    fn runs_to_completion_in_arrival_order() {
        let mut ctx = Context::new();
        ctx.fork(2, 1);
        ctx.fork(1, 30);
        ctx.fork(3, 5);

        assert_eq!(trace(&mut Fifo, &mut ctx), vec![1, 1, 2, 3, 3, 3]);
        assert_eq!(ctx.live_count(), 0);
    }
}
