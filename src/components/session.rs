use leptos::prelude::*;

/// Counter bumped whenever the server-side session may have changed
/// (confirmation, sign-in, sign-out). Resources that show the current user
/// key on it so they refetch without a full page load.
#[derive(Clone, Copy)]
pub struct SessionVersion(RwSignal<u32>);

impl SessionVersion {
    pub fn provide() {
        provide_context(Self(RwSignal::new(0)));
    }

    pub fn current() -> Self {
        use_context::<Self>().unwrap_or_else(|| Self(RwSignal::new(0)))
    }

    /// Tracked read.
    pub fn get(self) -> u32 {
        self.0.get()
    }

    pub fn bump(self) {
        self.0.update(|v| *v += 1);
    }
}
