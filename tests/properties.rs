//! Property-based checks of chain composition

use deferred_result::executor::inline::InlineExecutor;
use deferred_result::{Deferred, Error, Executor, State};
use proptest::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};


/// Build a chain appending each suffix in turn, failing at the given link
fn build_chain(executor: Arc<dyn Executor>,
               seed: String,
               suffixes: &[String],
               fail_at: Option<usize>,
               invoked: Arc<AtomicUsize>) -> Deferred<String, String> {
    let mut link = Deferred::with_executor(executor, move || Ok(seed));
    for (index, suffix) in suffixes.iter().cloned().enumerate() {
        let invoked = invoked.clone();
        link = link.then(move |s| {
            invoked.fetch_add(1, Ordering::SeqCst);
            if fail_at == Some(index) {
                Err(format!("link {} failed", index))
            } else {
                Ok(s + &suffix)
            }
        });
    }
    link
}


proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// A successful chain concatenates its suffixes in link order
    #[test]
    fn chain_concatenates(seed in "[a-z]{0,8}",
                          suffixes in prop::collection::vec("[ a-z0-9]{0,6}", 0..8)) {
        let invoked = Arc::new(AtomicUsize::new(0));
        let chain = build_chain(Arc::new(InlineExecutor::new()), seed.clone(),
                                &suffixes, None, invoked.clone());
        prop_assert_eq!(chain.result(), Ok(seed + &suffixes.concat()));
        prop_assert_eq!(chain.state(), State::Fulfilled);
        prop_assert_eq!(invoked.load(Ordering::SeqCst), suffixes.len());
    }

    /// A failing link short-circuits everything after it
    #[test]
    fn chain_short_circuits(suffixes in prop::collection::vec("[a-z]{1,4}", 1..8),
                            fail_seed in any::<prop::sample::Index>()) {
        let fail_at = fail_seed.index(suffixes.len());
        let invoked = Arc::new(AtomicUsize::new(0));
        let chain = build_chain(Arc::new(InlineExecutor::new()),
                                String::new(), &suffixes, Some(fail_at),
                                invoked.clone());
        prop_assert_eq!(chain.result(),
                        Err(Error::Failed(format!("link {} failed", fail_at))));
        prop_assert_eq!(chain.state(), State::Rejected);
        prop_assert_eq!(invoked.load(Ordering::SeqCst), fail_at + 1);
    }
}


proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    /// Chains behave the same when every link runs on its own thread
    #[test]
    fn threaded_chain_concatenates(suffixes in prop::collection::vec("[a-z]{0,3}", 0..5)) {
        let invoked = Arc::new(AtomicUsize::new(0));
        let chain = build_chain(deferred_result::executor::default_executor(),
                                "seed".to_owned(), &suffixes, None,
                                invoked.clone());
        prop_assert_eq!(chain.result(), Ok("seed".to_owned() + &suffixes.concat()));
        prop_assert_eq!(invoked.load(Ordering::SeqCst), suffixes.len());
    }
}
