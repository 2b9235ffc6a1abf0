use crate::checker::dictionary::Dictionaries;
use crate::document::TextBuffer;
use crate::error::{Result, ReviewError};
use crate::review::change::Change;
use crate::review::ledger::Exception;
use crate::review::Engine;
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::debug;

/// One-shot "import complete" signal, raised once per document load. It
/// carries the outcome so waiters learn about a failed import too.
#[derive(Default)]
struct ImportGate {
    outcome: Mutex<Option<Result<usize>>>,
    signal: Condvar,
}

impl ImportGate {
    fn close(&self) {
        *self.outcome.lock() = None;
    }

    fn finish(&self, outcome: Result<usize>) {
        *self.outcome.lock() = Some(outcome);
        self.signal.notify_all();
    }

    fn is_open(&self) -> bool {
        matches!(*self.outcome.lock(), Some(Ok(_)))
    }

    fn wait(&self) -> Result<usize> {
        let mut outcome = self.outcome.lock();
        loop {
            if let Some(result) = outcome.as_ref() {
                return result.clone();
            }
            self.signal.wait(&mut outcome);
        }
    }
}

/// Raises the gate when dropped, so an import that unwinds still wakes
/// its waiters.
struct Completion<'a> {
    gate: &'a ImportGate,
    outcome: Option<Result<usize>>,
}

impl<'a> Completion<'a> {
    fn new(gate: &'a ImportGate) -> Self {
        Self {
            gate,
            outcome: None,
        }
    }
}

impl Drop for Completion<'_> {
    fn drop(&mut self) {
        let outcome = self
            .outcome
            .take()
            .unwrap_or(Err(ReviewError::ImportAborted));
        self.gate.finish(outcome);
    }
}

/// A reviewer session shared between the interactive surface and a
/// background scan.
///
/// Every review operation runs under one session lock, and none is allowed
/// until the scan for the current document has completed.
pub struct ReviewSession {
    engine: Mutex<Engine>,
    imported: ImportGate,
}

impl ReviewSession {
    pub fn new(engine: Engine) -> Self {
        Self {
            engine: Mutex::new(engine),
            imported: ImportGate::default(),
        }
    }

    /// Load a document and its dictionaries and scan it on the calling thread.
    pub fn import(&self, buffer: TextBuffer, dictionaries: Dictionaries) -> Result<usize> {
        self.imported.close();
        let mut completion = Completion::new(&self.imported);
        let found = {
            let mut engine = self.engine.lock();
            engine.load_document(buffer);
            engine.load_dictionaries(dictionaries);
            engine.scan()
        };
        completion.outcome = Some(found.clone());
        found
    }

    /// Same as [`ReviewSession::import`] on a worker thread. The session is
    /// gated from the moment this returns until the scan completes.
    pub fn import_in_background(
        self: &Arc<Self>,
        buffer: TextBuffer,
        dictionaries: Dictionaries,
    ) -> JoinHandle<Result<usize>> {
        self.imported.close();
        let session = Arc::clone(self);
        thread::spawn(move || {
            debug!("background scan started");
            session.import(buffer, dictionaries)
        })
    }

    pub fn is_imported(&self) -> bool {
        self.imported.is_open()
    }

    /// Block until the current import has ended and return its outcome.
    /// An import that panicked reports [`ReviewError::ImportAborted`].
    pub fn wait_until_imported(&self) -> Result<usize> {
        self.imported.wait()
    }

    /// Lock the engine for a review operation.
    pub fn lock(&self) -> Result<MutexGuard<'_, Engine>> {
        if !self.imported.is_open() {
            return Err(ReviewError::ScanIncomplete);
        }
        Ok(self.engine.lock())
    }

    pub fn advance(&self) -> Result<Exception> {
        self.lock()?.advance().cloned()
    }

    pub fn retreat(&self) -> Result<Exception> {
        self.lock()?.retreat().cloned()
    }

    pub fn current(&self) -> Result<Exception> {
        self.lock()?.current().cloned()
    }

    pub fn set_unresolved_only(&self, on: bool) -> Result<()> {
        self.lock()?.set_unresolved_only(on);
        Ok(())
    }

    pub fn apply_change(&self, change: &Change) -> Result<usize> {
        self.lock()?.apply_change(change)
    }

    pub fn undo(&self) -> Result<bool> {
        Ok(self.lock()?.undo())
    }

    pub fn contents(&self) -> Result<String> {
        Ok(self.lock()?.contents())
    }

    /// Give back the engine once no other handle to the session remains.
    pub fn into_engine(self) -> Engine {
        self.engine.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::dictionary::{GenericDictionary, ProjectDictionary};
    use crate::config::Checks;

    fn dictionaries() -> Dictionaries {
        Dictionaries::new(
            GenericDictionary::from_words(["i", "saw", "the", "cat"]).unwrap(),
            ProjectDictionary::new(),
        )
    }

    fn buffer() -> TextBuffer {
        ["I saw teh cat.", "I saw teh cat."].into_iter().collect()
    }

    #[test]
    fn test_review_is_gated_until_import() {
        let session = ReviewSession::new(Engine::new(Checks::default(), "ann"));
        assert!(!session.is_imported());
        assert_eq!(session.advance().unwrap_err(), ReviewError::ScanIncomplete);

        assert_eq!(session.import(buffer(), dictionaries()).unwrap(), 2);
        assert!(session.is_imported());
        assert_eq!(session.advance().unwrap().incorrect_word, "teh");
    }

    #[test]
    fn test_background_import_signals_completion() {
        let session = Arc::new(ReviewSession::new(Engine::new(Checks::default(), "ann")));
        let handle = session.import_in_background(buffer(), dictionaries());

        assert_eq!(session.wait_until_imported(), Ok(2));
        assert!(session.is_imported());
        assert_eq!(handle.join().unwrap(), Ok(2));

        session.advance().unwrap();
        assert_eq!(session.apply_change(&Change::correct("the")).unwrap(), 2);
        assert_eq!(session.contents().unwrap(), "I saw the cat.\nI saw the cat.");
        assert_eq!(session.undo(), Ok(true));
        assert_eq!(session.contents().unwrap(), "I saw teh cat.\nI saw teh cat.");
    }

    #[test]
    fn test_session_is_shared_across_threads() {
        let session = Arc::new(ReviewSession::new(Engine::new(Checks::default(), "ann")));
        session.import(buffer(), dictionaries()).unwrap();

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let session = Arc::clone(&session);
                thread::spawn(move || session.lock().map(|engine| engine.exception_count()))
            })
            .collect();

        for worker in workers {
            assert_eq!(worker.join().unwrap(), Ok(2));
        }
    }

    #[test]
    fn test_waiters_see_an_aborted_import() {
        let gate = Arc::new(ImportGate::default());
        gate.close();

        let worker = {
            let gate = Arc::clone(&gate);
            thread::spawn(move || {
                let _completion = Completion::new(&gate);
                panic!("scan aborted");
            })
        };

        assert_eq!(gate.wait(), Err(ReviewError::ImportAborted));
        assert!(!gate.is_open());
        assert!(worker.join().is_err());
    }

    #[test]
    fn test_completed_import_reports_its_outcome() {
        let gate = ImportGate::default();
        gate.close();
        {
            let mut completion = Completion::new(&gate);
            completion.outcome = Some(Err(ReviewError::DictionariesNotLoaded));
        }
        assert_eq!(gate.wait(), Err(ReviewError::DictionariesNotLoaded));
        assert!(!gate.is_open());
    }
}
