use super::trial::Trial;
use anyhow::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
pub struct StudentData<'a> {
    pub trials: [&'a Trial; 1],
}

/// Envelope the host expects around every trial snapshot.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentWork<'a> {
    pub is_auto_save: bool,
    pub is_submit: bool,
    pub student_data: StudentData<'a>,
    pub message_type: &'static str,
}

impl<'a> StudentWork<'a> {
    pub fn new(trial: &'a Trial) -> Self {
        Self {
            is_auto_save: false,
            is_submit: false,
            student_data: StudentData { trials: [trial] },
            message_type: "studentWork",
        }
    }
}

/// One-way channel to the embedding page. Nothing is acknowledged.
pub trait HostChannel {
    fn post(&mut self, message: &StudentWork<'_>) -> Result<()>;
}

/// Writes each message as a single JSON line.
pub struct JsonLinesHost<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesHost<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> HostChannel for JsonLinesHost<W> {
    fn post(&mut self, message: &StudentWork<'_>) -> Result<()> {
        serde_json::to_writer(&mut self.out, message)?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Keeps every posted message as JSON; clones share the same log.
    #[derive(Clone, Default)]
    pub struct RecordingHost {
        pub messages: Rc<RefCell<Vec<serde_json::Value>>>,
        pub fail: bool,
    }

    impl RecordingHost {
        pub fn last(&self) -> Option<serde_json::Value> {
            self.messages.borrow().last().cloned()
        }

        pub fn count(&self) -> usize {
            self.messages.borrow().len()
        }
    }

    impl HostChannel for RecordingHost {
        fn post(&mut self, message: &StudentWork<'_>) -> Result<()> {
            if self.fail {
                anyhow::bail!("host unreachable");
            }
            self.messages.borrow_mut().push(serde_json::to_value(message)?);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::Body;

    #[test]
    fn test_envelope_fields() {
        let mut trial = Trial::with_id(1);
        trial.add_point(Body::Hot, 0, 100.0);
        let json = serde_json::to_value(StudentWork::new(&trial)).unwrap();
        assert_eq!(json["isAutoSave"], false);
        assert_eq!(json["isSubmit"], false);
        assert_eq!(json["messageType"], "studentWork");
        assert_eq!(json["studentData"]["trials"][0]["id"], 1);
        assert_eq!(json["studentData"]["trials"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_json_lines_host_writes_one_line_per_message() {
        let trial = Trial::with_id(9);
        let mut host = JsonLinesHost::new(Vec::new());
        host.post(&StudentWork::new(&trial)).unwrap();
        host.post(&StudentWork::new(&trial)).unwrap();

        let text = String::from_utf8(host.out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(parsed["studentData"]["trials"][0]["id"], 9);
    }
}
