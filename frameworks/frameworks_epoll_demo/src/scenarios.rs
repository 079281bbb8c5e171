//! Scenarios Module
//!
//! Each scenario is a short, deterministic sequence of real epoll calls on
//! a nonblocking socket pair (or stdin), with zero-timeout waits only, so
//! every scenario terminates immediately.

use std::fmt;
use std::io::{self, Read, Write};
use std::os::fd::AsFd;
use std::os::unix::net::UnixStream;

use nix::sys::epoll::{Epoll, EpollCreateFlags, EpollEvent, EpollFlags};
use thiserror::Error;

use crate::args::Scenario;

const SOCKET_TOKEN: u64 = 1;
const STDIN_TOKEN: u64 = 0;

#[derive(Debug, Error)]
pub enum DemoError {
    #[error("epoll_create() failed: {0}")]
    Create(#[source] nix::Error),

    #[error("epoll_ctl() failed: {0}")]
    Ctl(#[source] nix::Error),

    #[error("epoll_wait() failed: {0}")]
    Wait(#[source] nix::Error),

    #[error("socket I/O failed: {0}")]
    Io(#[from] io::Error),
}

impl DemoError {
    /// Process exit status for this failure
    pub fn exit_code(&self) -> i32 {
        match self {
            DemoError::Create(_) | DemoError::Io(_) => 1,
            DemoError::Ctl(_) => 2,
            DemoError::Wait(_) => 3,
        }
    }
}

/// What a scenario observed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioReport {
    pub scenario: &'static str,
    /// Events returned by all waits together
    pub ready_events: usize,
    pub bytes_read: usize,
}

impl fmt::Display for ScenarioReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ready event(s), {} byte(s) read",
            self.scenario, self.ready_events, self.bytes_read
        )
    }
}

/// Run `scenario` to completion
pub fn run(scenario: Scenario) -> Result<ScenarioReport, DemoError> {
    let mut report = ScenarioReport {
        scenario: scenario.name(),
        ready_events: 0,
        bytes_read: 0,
    };

    match scenario {
        Scenario::IdleStdin { polls } => idle_stdin(polls, &mut report)?,
        Scenario::UndrainedRearm => undrained_rearm(&mut report)?,
        Scenario::DrainedRearm => drained_rearm(&mut report)?,
        Scenario::OneShot => one_shot(&mut report)?,
    }

    log::info!("{}", report);
    Ok(report)
}

fn idle_stdin(polls: usize, report: &mut ScenarioReport) -> Result<(), DemoError> {
    let epoll = create()?;
    let stdin = io::stdin();
    epoll
        .add(stdin.as_fd(), EpollEvent::new(EpollFlags::EPOLLIN, STDIN_TOKEN))
        .map_err(DemoError::Ctl)?;

    for _ in 0..polls {
        poll(&epoll, report)?;
    }
    Ok(())
}

fn undrained_rearm(report: &mut ScenarioReport) -> Result<(), DemoError> {
    let epoll = create()?;
    let (local, peer) = socket_pair()?;
    epoll
        .add(&local, EpollEvent::new(EpollFlags::EPOLLIN, SOCKET_TOKEN))
        .map_err(DemoError::Ctl)?;

    // Nothing there yet: EAGAIN does not consume readiness
    report.bytes_read += drain(&local)?;
    (&peer).write_all(b"ping")?;
    poll(&epoll, report)?;

    epoll
        .modify(&local, &mut EpollEvent::new(EpollFlags::EPOLLOUT, SOCKET_TOKEN))
        .map_err(DemoError::Ctl)?;
    Ok(())
}

fn drained_rearm(report: &mut ScenarioReport) -> Result<(), DemoError> {
    let epoll = create()?;
    let (local, peer) = socket_pair()?;
    epoll
        .add(&local, EpollEvent::new(EpollFlags::EPOLLIN, SOCKET_TOKEN))
        .map_err(DemoError::Ctl)?;

    (&peer).write_all(b"ping")?;
    poll(&epoll, report)?;
    report.bytes_read += drain(&local)?;

    epoll
        .modify(&local, &mut EpollEvent::new(EpollFlags::EPOLLOUT, SOCKET_TOKEN))
        .map_err(DemoError::Ctl)?;
    poll(&epoll, report)?;
    (&local).write_all(b"pong")?;

    epoll.delete(&local).map_err(DemoError::Ctl)?;
    Ok(())
}

fn one_shot(report: &mut ScenarioReport) -> Result<(), DemoError> {
    let epoll = create()?;
    let (local, peer) = socket_pair()?;
    let flags = EpollFlags::EPOLLIN | EpollFlags::EPOLLONESHOT;
    epoll
        .add(&local, EpollEvent::new(flags, SOCKET_TOKEN))
        .map_err(DemoError::Ctl)?;

    (&peer).write_all(b"ping")?;
    poll(&epoll, report)?;
    // Disarmed: the pending data is not reported again
    poll(&epoll, report)?;
    report.bytes_read += drain(&local)?;

    epoll
        .modify(&local, &mut EpollEvent::new(flags, SOCKET_TOKEN))
        .map_err(DemoError::Ctl)?;
    epoll.delete(&local).map_err(DemoError::Ctl)?;
    Ok(())
}

fn create() -> Result<Epoll, DemoError> {
    Epoll::new(EpollCreateFlags::EPOLL_CLOEXEC).map_err(DemoError::Create)
}

fn socket_pair() -> Result<(UnixStream, UnixStream), DemoError> {
    let (local, peer) = UnixStream::pair()?;
    local.set_nonblocking(true)?;
    peer.set_nonblocking(true)?;
    Ok((local, peer))
}

fn poll(epoll: &Epoll, report: &mut ScenarioReport) -> Result<usize, DemoError> {
    let mut events = [EpollEvent::empty(); 4];
    let ready = epoll.wait(&mut events, 0).map_err(DemoError::Wait)?;
    report.ready_events += ready;
    Ok(ready)
}

/// Read until the socket would block; returns the byte count
fn drain(mut stream: &UnixStream) -> io::Result<usize> {
    let mut buf = [0u8; 256];
    let mut total = 0;
    loop {
        match stream.read(&mut buf) {
            Ok(0) => return Ok(total),
            Ok(n) => total += n,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(total),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}
