// crates/hf_solver/src/engine/progress.rs

//! 进度输出
//!
//! 仅根进程输出。表头 `Step, Time, R(name0), ...`，之后每个输出间隔一行
//! `step, time, r0, r1, ...`。

use std::io::{self, Write};

use hf_foundation::HfResult;

/// 进度输出器
pub struct ProgressReporter {
    writer: Option<Box<dyn Write + Send>>,
}

impl std::fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("enabled", &self.writer.is_some())
            .finish()
    }
}

impl ProgressReporter {
    /// 输出到标准输出
    pub fn stdout() -> Self {
        Self::to_writer(io::stdout())
    }

    /// 输出到任意 writer
    pub fn to_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            writer: Some(Box::new(writer)),
        }
    }

    /// 不输出
    pub fn silent() -> Self {
        Self { writer: None }
    }

    /// 是否启用
    pub fn is_enabled(&self) -> bool {
        self.writer.is_some()
    }

    /// 表头
    pub fn header(&mut self, names: &[String]) -> HfResult<()> {
        if let Some(w) = self.writer.as_mut() {
            let columns: Vec<String> = names.iter().map(|n| format!("R({n})")).collect();
            writeln!(w, "Step, Time, {}", columns.join(", "))?;
            w.flush()?;
        }
        Ok(())
    }

    /// 一行进度
    pub fn row(&mut self, step: usize, time: f64, residuals: &[f64]) -> HfResult<()> {
        if let Some(w) = self.writer.as_mut() {
            let values: Vec<String> = residuals.iter().map(|r| format!("{r:e}")).collect();
            writeln!(w, "{}, {}, {}", step, time, values.join(", "))?;
            w.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Shared(Arc<parking_lot::Mutex<Vec<u8>>>);

    impl Write for Shared {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_format() {
        let buf = Shared::default();
        let mut rep = ProgressReporter::to_writer(buf.clone());
        rep.header(&["rho".to_string(), "E".to_string()]).unwrap();
        rep.row(100, 0.5, &[0.25, 1e-3]).unwrap();

        let text = String::from_utf8(buf.0.lock().clone()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Step, Time, R(rho), R(E)");
        assert!(lines[1].starts_with("100, 0.5, "));
        assert_eq!(lines[1].split(", ").count(), 4);
    }

    #[test]
    fn test_silent() {
        let mut rep = ProgressReporter::silent();
        assert!(!rep.is_enabled());
        assert!(rep.header(&["q".to_string()]).is_ok());
    }
}
