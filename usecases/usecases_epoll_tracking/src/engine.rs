//! Tracking Engine Module
//!
//! The shadow model of the process's epoll usage.
//!
//! The engine keeps two views of the same registrations:
//!
//! - per instance: descriptor -> [`DescriptorState`]
//! - per descriptor: the set of instances monitoring it (the registration index)
//!
//! Every hook keeps both views in agreement: a handle is in the index entry
//! of `fd` exactly when that instance's map contains `fd`.
//! [`TrackingEngine::check_consistency`] verifies this.
//!
//! Hooks that require a prior registration return [`TrackingError`] when it
//! is missing and mutate nothing in that case.

use std::collections::{BTreeSet, HashMap};

use entities_epoll_state::{DescriptorState, Epfd, Fd, Interest, ReadOutcome, WriteOutcome};

use crate::diagnostics::{Diagnostic, DiagnosticSink, LogSink};
use crate::error::TrackingError;

/// One entry of the array filled by `epoll_wait`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadyEvent {
    /// The `data` field, as given at registration time
    pub token: u64,
    pub events: Interest,
}

/// Shadow of one epoll instance
#[derive(Debug, Default)]
struct Instance {
    descriptors: HashMap<Fd, DescriptorState>,
    // epoll_wait reports the registration's data, not the fd
    tokens: HashMap<u64, Fd>,
    token_of: HashMap<Fd, u64>,
}

impl Instance {
    fn bind_token(&mut self, fd: Fd, token: u64) {
        self.forget_token(fd);
        if let Some(previous) = self.tokens.insert(token, fd) {
            if previous != fd {
                self.token_of.remove(&previous);
            }
        }
        self.token_of.insert(fd, token);
    }

    fn forget_token(&mut self, fd: Fd) {
        if let Some(token) = self.token_of.remove(&fd) {
            if self.tokens.get(&token) == Some(&fd) {
                self.tokens.remove(&token);
            }
        }
    }

    fn remove(&mut self, fd: Fd) -> Option<DescriptorState> {
        self.forget_token(fd);
        self.descriptors.remove(&fd)
    }
}

/// Shadow state of every epoll instance and registration of a process
#[derive(Debug)]
pub struct TrackingEngine<S: DiagnosticSink = LogSink> {
    instances: HashMap<Epfd, Instance>,
    registrations: HashMap<Fd, BTreeSet<Epfd>>,
    sink: S,
}

impl TrackingEngine<LogSink> {
    /// Create an engine reporting through the `log` facade
    pub fn new() -> Self {
        Self::with_sink(LogSink)
    }
}

impl Default for TrackingEngine<LogSink> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: DiagnosticSink> TrackingEngine<S> {
    /// Create an engine reporting to `sink`
    pub fn with_sink(sink: S) -> Self {
        Self {
            instances: HashMap::new(),
            registrations: HashMap::new(),
            sink,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// An epoll instance was created
    ///
    /// Negative handles (failed creation) are ignored. A handle that is
    /// already tracked is reported and its registrations are kept.
    pub fn on_epoll_create(&mut self, handle: Epfd) {
        if handle < 0 {
            return;
        }
        if self.instances.contains_key(&handle) {
            self.sink.report(Diagnostic::duplicate_instance(handle));
            return;
        }
        log::trace!("epoll instance {} created", handle);
        self.instances.insert(handle, Instance::default());
    }

    /// `EPOLL_CTL_ADD` succeeded
    ///
    /// Must only be called after the real call returned 0. An instance
    /// created before tracking started is adopted on its first registration.
    pub fn on_add_event(&mut self, handle: Epfd, fd: Fd, events: Interest) -> Result<(), TrackingError> {
        if handle < 0 {
            return Err(TrackingError::UnknownInstance { handle });
        }
        if fd < 0 {
            return Err(TrackingError::UnknownDescriptor { handle, fd });
        }

        let instance = self.instances.entry(handle).or_insert_with(|| {
            log::debug!("adopting untracked epoll instance {}", handle);
            Instance::default()
        });
        let state = DescriptorState::from_events(events);
        if instance.descriptors.insert(fd, state).is_some() {
            log::debug!("fd {} added twice to epoll instance {}", fd, handle);
        }
        self.registrations.entry(fd).or_default().insert(handle);

        log::trace!("epoll instance {} add fd {} {:?}", handle, fd, events);
        Ok(())
    }

    /// `EPOLL_CTL_MOD` succeeded
    ///
    /// Reports a direction whose monitoring is dropped while its readiness
    /// was never consumed, then replaces the state with a fresh one.
    pub fn on_mod_event(&mut self, handle: Epfd, fd: Fd, events: Interest) -> Result<(), TrackingError> {
        let instance = self
            .instances
            .get_mut(&handle)
            .ok_or(TrackingError::UnknownInstance { handle })?;
        let current = instance
            .descriptors
            .get_mut(&fd)
            .ok_or(TrackingError::UnknownDescriptor { handle, fd })?;

        let next = DescriptorState::from_events(events);
        if current.loses_undrained_input(&next) {
            let diagnostic = Diagnostic::undrained_read(handle, fd);
            self.sink.report(if current.edge_triggered() {
                diagnostic.on_edge_triggered()
            } else {
                diagnostic
            });
        }
        if current.loses_unflushed_output(&next) {
            let diagnostic = Diagnostic::undrained_write(handle, fd);
            self.sink.report(if current.edge_triggered() {
                diagnostic.on_edge_triggered()
            } else {
                diagnostic
            });
        }
        *current = next;

        log::trace!("epoll instance {} mod fd {} {:?}", handle, fd, events);
        Ok(())
    }

    /// Remember the `data` token of a registration, for [`Self::on_wait`]
    pub fn bind_token(&mut self, handle: Epfd, fd: Fd, token: u64) -> Result<(), TrackingError> {
        let instance = self
            .instances
            .get_mut(&handle)
            .ok_or(TrackingError::UnknownInstance { handle })?;
        if !instance.descriptors.contains_key(&fd) {
            return Err(TrackingError::UnknownDescriptor { handle, fd });
        }
        instance.bind_token(fd, token);
        Ok(())
    }

    /// `EPOLL_CTL_DEL` succeeded
    ///
    /// Erasing a pair that is not registered is a no-op.
    pub fn on_erase_event(&mut self, handle: Epfd, fd: Fd) -> Result<(), TrackingError> {
        let instance = self
            .instances
            .get_mut(&handle)
            .ok_or(TrackingError::UnknownInstance { handle })?;
        if instance.remove(fd).is_none() {
            return Ok(());
        }
        self.unindex(fd, handle);

        log::trace!("epoll instance {} del fd {}", handle, fd);
        Ok(())
    }

    /// `epoll_wait` on `handle` returned `ready`
    ///
    /// Records the reported readiness; a one-shot registration is disarmed.
    /// Tokens that match no known registration are skipped.
    pub fn on_wait(&mut self, handle: Epfd, ready: &[ReadyEvent]) {
        let Some(instance) = self.instances.get_mut(&handle) else {
            return;
        };
        for event in ready {
            let Some(&fd) = instance.tokens.get(&event.token) else {
                continue;
            };
            if let Some(state) = instance.descriptors.get_mut(&fd) {
                *state = state.with_reported(event.events);
            }
        }
    }

    /// A read-family call on `fd` completed with `outcome`
    pub fn on_read(&mut self, fd: Fd, outcome: ReadOutcome) {
        if outcome.is_activity() {
            self.update_monitors(fd, DescriptorState::with_in_activity);
        }
    }

    /// A write-family call on `fd` completed with `outcome`
    pub fn on_write(&mut self, fd: Fd, outcome: WriteOutcome) {
        if outcome.is_activity() {
            self.update_monitors(fd, DescriptorState::with_out_activity);
        }
    }

    /// `close(fd)` succeeded
    ///
    /// Closing an epoll handle drops the instance and every index entry
    /// referring to it. Closing a monitored descriptor drops it from every
    /// instance. An epoll handle nested in another instance gets both.
    pub fn on_close(&mut self, fd: Fd) {
        if let Some(instance) = self.instances.remove(&fd) {
            for monitored in instance.descriptors.keys() {
                self.unindex(*monitored, fd);
            }
            log::trace!("epoll instance {} closed", fd);
        }

        if let Some(handles) = self.registrations.remove(&fd) {
            for handle in handles {
                if let Some(instance) = self.instances.get_mut(&handle) {
                    instance.remove(fd);
                }
            }
            log::trace!("monitored fd {} closed", fd);
        }
    }

    /// Whether `handle` is a tracked epoll instance
    pub fn is_tracked(&self, handle: Epfd) -> bool {
        self.instances.contains_key(&handle)
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// State of the registration of `fd` in `handle`
    pub fn descriptor_state(&self, handle: Epfd, fd: Fd) -> Option<DescriptorState> {
        self.instances
            .get(&handle)
            .and_then(|instance| instance.descriptors.get(&fd))
            .copied()
    }

    /// Descriptors registered with `handle`, ascending; `None` if untracked
    pub fn descriptors_of(&self, handle: Epfd) -> Option<Vec<Fd>> {
        self.instances.get(&handle).map(|instance| {
            let mut fds: Vec<Fd> = instance.descriptors.keys().copied().collect();
            fds.sort_unstable();
            fds
        })
    }

    /// Instances monitoring `fd`, ascending
    pub fn instances_monitoring(&self, fd: Fd) -> Vec<Epfd> {
        self.registrations
            .get(&fd)
            .map(|handles| handles.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Verify that the registration index mirrors the per-instance maps
    pub fn check_consistency(&self) -> Result<(), TrackingError> {
        for (&handle, instance) in &self.instances {
            for &fd in instance.descriptors.keys() {
                let indexed = self
                    .registrations
                    .get(&fd)
                    .map_or(false, |handles| handles.contains(&handle));
                if !indexed {
                    return Err(TrackingError::IndexOutOfSync { handle, fd });
                }
            }
            for (token, &fd) in &instance.tokens {
                let bound = instance.token_of.get(&fd) == Some(token);
                if !bound || !instance.descriptors.contains_key(&fd) {
                    return Err(TrackingError::IndexOutOfSync { handle, fd });
                }
            }
            for (&fd, token) in &instance.token_of {
                if instance.tokens.get(token) != Some(&fd) {
                    return Err(TrackingError::IndexOutOfSync { handle, fd });
                }
            }
        }

        for (&fd, handles) in &self.registrations {
            if handles.is_empty() {
                return Err(TrackingError::IndexOutOfSync { handle: -1, fd });
            }
            for &handle in handles {
                let registered = self
                    .instances
                    .get(&handle)
                    .map_or(false, |instance| instance.descriptors.contains_key(&fd));
                if !registered {
                    return Err(TrackingError::IndexOutOfSync { handle, fd });
                }
            }
        }

        Ok(())
    }

    fn unindex(&mut self, fd: Fd, handle: Epfd) {
        if let Some(handles) = self.registrations.get_mut(&fd) {
            handles.remove(&handle);
            if handles.is_empty() {
                self.registrations.remove(&fd);
            }
        }
    }

    fn update_monitors(&mut self, fd: Fd, update: fn(DescriptorState) -> DescriptorState) {
        let Some(handles) = self.registrations.get(&fd) else {
            return;
        };
        for handle in handles {
            match self
                .instances
                .get_mut(handle)
                .and_then(|instance| instance.descriptors.get_mut(&fd))
            {
                Some(state) => *state = update(*state),
                None => log::error!(
                    "registration index out of sync for fd {} and epoll instance {}",
                    fd,
                    handle
                ),
            }
        }
    }
}
