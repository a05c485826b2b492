use std::{
    cell::{Cell, RefCell},
    panic::{self, AssertUnwindSafe},
    rc::Rc,
};

use tramp::{Effect, Fault, Trampoline, run};

fn counter_step(counter: &Rc<Cell<u64>>) -> Effect<u64> {
    let counter = Rc::clone(counter);
    Effect::opaque(move || {
        counter.set(counter.get() + 1);
        Ok(counter.get())
    })
}

fn marker(log: &Rc<RefCell<Vec<String>>>, name: &str) -> Effect<()> {
    let log = Rc::clone(log);
    let name = name.to_string();
    Effect::opaque(move || {
        log.borrow_mut().push(name.clone());
        Ok(())
    })
}

fn count_to(counter: Rc<Cell<u64>>, limit: u64) -> Effect<u64> {
    counter_step(&counter).and_then(move |n| {
        if n == limit {
            Effect::lift(n)
        } else {
            count_to(Rc::clone(&counter), limit)
        }
    })
}

fn forever(counter: Rc<Cell<u64>>, threshold: u64) -> Effect<()> {
    let step = {
        let counter = Rc::clone(&counter);
        Effect::opaque(move || {
            counter.set(counter.get() + 1);
            if counter.get() == threshold {
                Err(Fault::new(format!("threshold {} reached", threshold)))
            } else {
                Ok(())
            }
        })
    };
    step.and_then(move |_| forever(Rc::clone(&counter), threshold))
}

#[test]
fn lift_returns_value_without_side_effects() {
    assert_eq!(run(&Effect::lift(17)), Ok(17));
    assert_eq!(run(&Effect::lift("text")), Ok("text"));
    assert_eq!(run(&Effect::lift(vec![1, 2, 3])), Ok(vec![1, 2, 3]));
}

#[test]
fn map_applies_transform_to_lifted_value() {
    let effect = Effect::lift(5).map(|x: i32| x.to_string() + "!");
    assert_eq!(run(&effect), Ok("5!".to_string()));
}

#[test]
fn left_identity_holds() {
    let continuation = |x: i32| Effect::lift(x * 3).map(|y| y - 1);
    let bound = Effect::lift(7).and_then(continuation);
    assert_eq!(run(&bound), run(&continuation(7)));
}

#[test]
fn apply_runs_function_effect_before_argument_effect() {
    for (first, second) in [("f", "x"), ("load", "store"), ("a", "b")] {
        let log = Rc::new(RefCell::new(Vec::new()));
        let function = marker(&log, first).map(|_| |n: i32| n * 2);
        let argument = marker(&log, second).map(|_| 21);

        assert_eq!(run(&Effect::apply_with(function, argument)), Ok(42));
        assert_eq!(*log.borrow(), vec![first.to_string(), second.to_string()]);
    }
}

#[test]
fn apply_order_holds_when_both_sides_are_composite() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let function = marker(&log, "f1")
        .then(marker(&log, "f2"))
        .map(|_| |s: String| s.len());
    let argument = marker(&log, "x1")
        .and_then({
            let log = Rc::clone(&log);
            move |_| marker(&log, "x2")
        })
        .map(|_| "four".to_string());

    assert_eq!(run(&Effect::apply_with(function, argument)), Ok(4));
    assert_eq!(*log.borrow(), vec!["f1", "f2", "x1", "x2"]);
}

#[test]
fn ten_million_sequential_binds_do_not_overflow() {
    const STEPS: u64 = 10_000_000;
    let counter = Rc::new(Cell::new(0));
    let mut trampoline = Trampoline::new();

    assert_eq!(trampoline.run(&count_to(Rc::clone(&counter), STEPS)), Ok(STEPS));
    assert_eq!(counter.get(), STEPS);
    assert_eq!(trampoline.stats().max_depth, 1);
}

#[test]
fn deep_left_nested_chain_runs_on_the_heap() {
    const DEPTH: u64 = 200_000;
    let counter = Rc::new(Cell::new(0));
    let mut effect = counter_step(&counter);
    for _ in 0..DEPTH {
        let counter = Rc::clone(&counter);
        effect = effect.and_then(move |_| counter_step(&counter));
    }

    let mut trampoline = Trampoline::new();
    assert_eq!(trampoline.run(&effect), Ok(DEPTH + 1));
    assert_eq!(trampoline.stats().max_depth, DEPTH as usize);
}

#[test]
fn right_nested_then_chain_runs_and_drops() {
    const DEPTH: u64 = 200_000;
    let counter = Rc::new(Cell::new(0));
    let mut effect = Effect::lift(());
    for _ in 0..DEPTH {
        effect = counter_step(&counter).then(effect);
    }

    let mut trampoline = Trampoline::new();
    assert_eq!(trampoline.run(&effect), Ok(()));
    assert_eq!(counter.get(), DEPTH);
    assert_eq!(trampoline.stats().max_depth, 1);
    assert_eq!(trampoline.stats().binds, DEPTH as usize);

    drop(effect);
}

#[test]
fn running_twice_repeats_every_effect() {
    let counter = Rc::new(Cell::new(0));
    let effect = counter_step(&counter).map(|n| n * 100);

    let first = run(&effect);
    let second = run(&effect);

    assert_eq!(first, Ok(100));
    assert_eq!(second, Ok(200));
    assert_eq!(counter.get(), 2);
}

#[test]
fn shared_node_runs_once_per_reference() {
    let counter = Rc::new(Cell::new(0));
    let shared = counter_step(&counter);
    let both = Effect::apply_with(
        shared.clone().map(|a| move |b: u64| (a, b)),
        shared,
    );

    assert_eq!(run(&both), Ok((1, 2)));
    assert_eq!(counter.get(), 2);
}

#[test]
fn fault_escapes_and_discards_pending_work() {
    let resolved = Rc::new(Cell::new(0));
    let after = {
        let resolved = Rc::clone(&resolved);
        move |x: i32| {
            resolved.set(resolved.get() + 1);
            x
        }
    };
    let failing = Effect::opaque(|| Err::<i32, _>(Fault::new("disk full")));
    let effect = Effect::apply_with(
        Effect::lift(|x: i32| x + 1),
        failing.map(after.clone()).map(after),
    )
    .and_then(|x| Effect::lift(x * 2));

    let mut trampoline = Trampoline::new();
    assert_eq!(trampoline.run(&effect), Err(Fault::new("disk full")));
    assert_eq!(resolved.get(), 0);
    assert_eq!(trampoline.depth(), 0);

    let stats = *trampoline.stats();
    assert_eq!(stats.discarded, 4);
    assert_eq!(stats.pushed, stats.popped + stats.discarded);
}

#[test]
fn endless_loop_stops_at_threshold_with_flat_stack() {
    for threshold in [1_000, 100_000, 1_000_000] {
        let counter = Rc::new(Cell::new(0));
        let mut trampoline = Trampoline::new();

        let outcome = trampoline.run(&forever(Rc::clone(&counter), threshold));

        assert_eq!(
            outcome,
            Err(Fault::new(format!("threshold {} reached", threshold)))
        );
        assert_eq!(counter.get(), threshold);
        assert_eq!(trampoline.stats().max_depth, 1);
        assert_eq!(trampoline.stats().binds, threshold as usize - 1);
    }
}

#[test]
fn nested_run_inside_opaque_step() {
    let inner = Effect::lift(2).map(|x: i32| x * 5);
    let outer = Effect::opaque(move || inner.invoke().map(|x| x + 1));

    assert_eq!(run(&outer.map(|x| x * 2)), Ok(22));
}

#[test]
fn panic_in_continuation_skips_remaining_work() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let effect = marker(&log, "before")
        .and_then(|_| -> Effect<()> { panic!("continuation gave up") })
        .then(marker(&log, "after"));

    let mut trampoline = Trampoline::new();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| trampoline.run(&effect)));

    assert!(outcome.is_err());
    assert_eq!(*log.borrow(), vec!["before"]);
    assert_eq!(trampoline.run(&marker(&log, "again")), Ok(()));
    assert_eq!(trampoline.depth(), 0);
    assert_eq!(trampoline.stats().pushed, 0);
}
