use std::cell::Cell;
use std::rc::Rc;

/// Handle given to one document read. It is cancelled as soon as a newer
/// read starts, so a slow read can never overwrite a fresher document.
#[derive(Clone, Debug)]
pub struct LoadToken {
    pub id: u64,
    is_cancelled: Rc<Cell<bool>>,
}

impl LoadToken {
    fn new(id: u64) -> Self {
        Self {
            id,
            is_cancelled: Rc::new(Cell::new(false)),
        }
    }

    pub fn cancel(&self) {
        self.is_cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.is_cancelled.get()
    }

    pub fn throw_if_cancelled(&self) -> Result<(), String> {
        if self.is_cancelled() {
            Err(format!("Load {} was superseded", self.id))
        } else {
            Ok(())
        }
    }
}

/// Issues load tokens; only the most recent one stays live.
#[derive(Debug, Default)]
pub struct LoadSequencer {
    next_id: u64,
    current: Option<LoadToken>,
}

impl LoadSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) -> LoadToken {
        // Cancel the read still in flight, if any
        if let Some(previous) = self.current.take() {
            previous.cancel();
        }

        self.next_id += 1;
        let token = LoadToken::new(self.next_id);
        self.current = Some(token.clone());
        token
    }

    pub fn cancel_all(&mut self) {
        if let Some(current) = self.current.take() {
            current.cancel();
        }
    }

    pub fn is_current(&self, token: &LoadToken) -> bool {
        !token.is_cancelled()
            && self
                .current
                .as_ref()
                .is_some_and(|current| current.id == token.id)
    }
}
