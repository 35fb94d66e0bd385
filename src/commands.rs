use calloop::generic::Generic;
use calloop::{Interest, LoopHandle, Mode, PostAction};
use log::{debug, warn};
use std::fs::File;
use std::io::{self, Read};

const READ_CHUNK: usize = 4096;

/// Unbuffered line splitter. Everything read is split right away, so no
/// command can sit in a buffer the poller does not see.
#[derive(Debug, Default)]
struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    /// One read from `source`. Returns the complete lines and whether the
    /// input has ended; a trailing partial line is flushed at end of input.
    fn read_from<R: Read>(&mut self, source: &mut R) -> io::Result<(Vec<String>, bool)> {
        let mut chunk = [0u8; READ_CHUNK];
        let n = match source.read(&mut chunk) {
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => return Ok((Vec::new(), false)),
            Err(e) => return Err(e),
        };
        let eof = n == 0;
        self.pending.extend_from_slice(&chunk[..n]);

        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            lines.push(String::from_utf8_lossy(&line[..pos]).into_owned());
        }
        if eof && !self.pending.is_empty() {
            lines.push(String::from_utf8_lossy(&self.pending).into_owned());
            self.pending.clear();
        }
        Ok((lines, eof))
    }
}

/// Feed each line of `input` to `on_line`. Returns false, after a warning,
/// when the input cannot be polled (e.g. `/dev/null` or a regular file);
/// the loop then runs without commands.
pub fn watch_commands<'l, D, F>(handle: &LoopHandle<'l, D>, input: File, mut on_line: F) -> bool
where
    F: FnMut(&str, &mut D) + 'l,
{
    let mut lines = LineBuffer::default();
    let source = Generic::new(input, Interest::READ, Mode::Level);
    let inserted = handle.insert_source(source, move |_, file, data| {
        let (batch, eof) = lines.read_from(&mut &**file)?;
        for line in batch {
            on_line(&line, data);
        }
        if eof {
            debug!("Command input closed");
            return Ok(PostAction::Remove);
        }
        Ok(PostAction::Continue)
    });
    match inserted {
        Ok(_) => true,
        Err(e) => {
            warn!("Commands disabled, input cannot be watched: {}", e.error);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calloop::EventLoop;
    use std::io::Write;
    use std::os::fd::OwnedFd;
    use std::os::unix::net::UnixStream;
    use std::time::Duration;

    #[test]
    fn test_one_read_yields_every_line() {
        let mut buffer = LineBuffer::default();
        let mut input: &[u8] = b"p\np\nres";
        let (lines, eof) = buffer.read_from(&mut input).unwrap();
        assert_eq!(lines, vec!["p", "p"]);
        assert!(!eof);

        let (lines, eof) = buffer.read_from(&mut input).unwrap();
        assert_eq!(lines, vec!["res"], "partial line flushed at end of input");
        assert!(eof);
    }

    #[test]
    fn test_commands_in_one_write_all_arrive() {
        let mut event_loop: EventLoop<Vec<String>> = EventLoop::try_new().unwrap();
        let (mut tx, rx) = UnixStream::pair().unwrap();
        let watched = watch_commands(
            &event_loop.handle(),
            File::from(OwnedFd::from(rx)),
            |line, seen: &mut Vec<String>| seen.push(line.to_string()),
        );
        assert!(watched);

        tx.write_all(b"p\np\n").unwrap();
        let mut seen = Vec::new();
        event_loop.dispatch(Duration::from_millis(200), &mut seen).unwrap();
        assert_eq!(seen, vec!["p", "p"]);

        drop(tx);
        event_loop.dispatch(Duration::from_millis(200), &mut seen).unwrap();
        event_loop.dispatch(Duration::from_millis(50), &mut seen).unwrap();
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn test_unpollable_input_is_skipped() {
        let event_loop: EventLoop<Vec<String>> = EventLoop::try_new().unwrap();
        let file = File::open(concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml")).unwrap();
        let watched = watch_commands(&event_loop.handle(), file, |line, seen: &mut Vec<String>| {
            seen.push(line.to_string())
        });
        assert!(!watched);
    }
}
