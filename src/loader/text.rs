/*!
 * Text Loader
 *
 * Whitespace separated input, one record per line:
 *
 * ```text
 * <fcfs> <sjf> <rr> [<edf>]
 * <rr_timeslice>
 * <rtf> <maxw> <stl> <fork_prob> [<overheat_delay>]
 * <process count>
 * <at> <pid> <ct> [<deadline>] <io_count> (r,d),(r,d),...
 * <time> <pid>
 * ```
 *
 * Process lines repeat `process count` times; kill lines run until EOF.
 * Blank lines are ignored.
 */

use super::{DataLoader, LoadedData};
use crate::core::config::SimulationConfig;
use crate::core::errors::{LoadError, LoadResult};
use crate::core::types::Tick;
use crate::process::{IoEvent, ProcessSpec};
use crate::simulation::SigKill;
use std::str::FromStr;

/// Reads the plain-text input format
#[derive(Debug, Clone, Copy, Default)]
pub struct TextLoader;

impl DataLoader for TextLoader {
    fn load_str(&self, input: &str) -> LoadResult<LoadedData> {
        let mut lines = input
            .lines()
            .enumerate()
            .map(|(index, line)| (index + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty());

        let mut next_line = |what: &str| {
            lines.next().ok_or_else(|| LoadError::Parse {
                line: 0,
                reason: format!("unexpected end of input, expected {what}"),
            })
        };

        let mut config = SimulationConfig::default();

        let (line, text) = next_line("processor counts")?;
        let counts: Vec<u32> = integers(line, text)?;
        match counts.as_slice() {
            [fcfs, sjf, rr] => {
                config.fcfs_count = *fcfs;
                config.sjf_count = *sjf;
                config.rr_count = *rr;
            }
            [fcfs, sjf, rr, edf] => {
                config.fcfs_count = *fcfs;
                config.sjf_count = *sjf;
                config.rr_count = *rr;
                config.edf_count = *edf;
            }
            _ => return Err(arity(line, "3 or 4 processor counts", counts.len())),
        }

        let (line, text) = next_line("round-robin time slice")?;
        config.rr_timeslice = single(line, text)?;

        let (line, text) = next_line("policy parameters")?;
        let params: Vec<Tick> = integers(line, text)?;
        match params.as_slice() {
            [rtf, maxw, stl, fork_prob, rest @ ..] if rest.len() <= 1 => {
                config.rtf = *rtf;
                config.maxw = *maxw;
                config.stl = *stl;
                config.fork_prob = u32::try_from(*fork_prob).map_err(|_| LoadError::Parse {
                    line,
                    reason: format!("fork probability {fork_prob} out of range"),
                })?;
                if let Some(delay) = rest.first() {
                    config.overheat_delay = *delay;
                }
            }
            _ => return Err(arity(line, "4 or 5 policy parameters", params.len())),
        }

        let (line, text) = next_line("process count")?;
        let count: usize = single(line, text)?;

        let mut processes = Vec::with_capacity(count);
        for _ in 0..count {
            let (line, text) = next_line("a process line")?;
            processes.push(parse_process(line, text)?);
        }

        let mut sigkills = Vec::new();
        for (line, text) in lines {
            match integers::<Tick>(line, text)?.as_slice() {
                [time, pid] => {
                    let pid = u32::try_from(*pid).map_err(|_| LoadError::Parse {
                        line,
                        reason: format!("pid {pid} out of range"),
                    })?;
                    sigkills.push(SigKill::new(*time, pid));
                }
                other => return Err(arity(line, "a kill time and a pid", other.len())),
            }
        }

        Ok(LoadedData {
            config,
            processes,
            sigkills,
        })
    }
}

fn parse_process(line: usize, text: &str) -> LoadResult<ProcessSpec> {
    let (head, io_text) = match text.find('(') {
        Some(pos) => text.split_at(pos),
        None => (text, ""),
    };

    let fields: Vec<Tick> = integers(line, head)?;
    let (at, pid, ct, deadline, io_count) = match fields.as_slice() {
        [at, pid, ct, io_count] => (*at, *pid, *ct, None, *io_count),
        [at, pid, ct, deadline, io_count] => (*at, *pid, *ct, Some(*deadline), *io_count),
        _ => return Err(arity(line, "4 or 5 process fields", fields.len())),
    };

    let pid = u32::try_from(pid).map_err(|_| LoadError::Parse {
        line,
        reason: format!("pid {pid} out of range"),
    })?;

    let io_events = parse_io_pairs(line, io_text)?;
    if io_events.len() as Tick != io_count {
        return Err(LoadError::Parse {
            line,
            reason: format!(
                "process {pid} declares {io_count} I/O requests but lists {}",
                io_events.len()
            ),
        });
    }

    let mut spec = ProcessSpec::new(pid, at, ct);
    spec.deadline = deadline;
    spec.io_events = io_events;
    Ok(spec)
}

/// `(r,d),(r,d)` with arbitrary whitespace
fn parse_io_pairs(line: usize, text: &str) -> LoadResult<Vec<IoEvent>> {
    let mut events = Vec::new();
    let mut rest = text.trim();

    while !rest.is_empty() {
        rest = rest.trim_start_matches(|c: char| c == ',' || c.is_whitespace());
        if rest.is_empty() {
            break;
        }
        let body = rest.strip_prefix('(').ok_or_else(|| LoadError::Parse {
            line,
            reason: format!("expected '(' before {rest:?}"),
        })?;
        let close = body.find(')').ok_or_else(|| LoadError::Parse {
            line,
            reason: "unterminated I/O pair".into(),
        })?;

        let (request, duration) = body[..close].split_once(',').ok_or_else(|| LoadError::Parse {
            line,
            reason: format!("I/O pair {:?} needs a comma", &body[..close]),
        })?;
        events.push(IoEvent::new(
            number(line, request.trim())?,
            number(line, duration.trim())?,
        ));
        rest = &body[close + 1..];
    }

    Ok(events)
}

fn integers<T: FromStr>(line: usize, text: &str) -> LoadResult<Vec<T>> {
    text.split_whitespace().map(|token| number(line, token)).collect()
}

fn single<T: FromStr>(line: usize, text: &str) -> LoadResult<T> {
    let mut values: Vec<T> = integers(line, text)?;
    if values.len() != 1 {
        return Err(arity(line, "a single value", values.len()));
    }
    values.pop().ok_or_else(|| arity(line, "a single value", 0))
}

fn number<T: FromStr>(line: usize, token: &str) -> LoadResult<T> {
    token.parse().map_err(|_| LoadError::Parse {
        line,
        reason: format!("{token:?} is not a non-negative integer"),
    })
}

fn arity(line: usize, expected: &str, found: usize) -> LoadError {
    LoadError::Parse {
        line,
        reason: format!("expected {expected}, found {found} values"),
    }
}
