//! 检测结果落地。
//!
//! 目录布局：`<root>/<series>/<pattern>.jsonl`，`<series>` 为百分号编码后的 series id。
//! 首行是 `RunHeader`，其后每行一条 `Detection`（带 mode 标签）。
//! `replace` 先写临时文件再 rename，读者不会看到半写的文件。

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use swingline::{Detection, DetectionMode, DetectionRun, PatternType};
use tracing::{debug, warn};

const RUN_EXT: &str = "jsonl";
const TMP_EXT: &str = "jsonl.tmp";

/// 每个 run 文件的首行。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunHeader {
	pub series_id: String,
	pub pattern: PatternType,
	pub mode: DetectionMode,
	pub written_at: DateTime<Utc>,
	pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredRun {
	pub header: RunHeader,
	pub detections: Vec<Detection>,
}

impl StoredRun {
	pub fn into_run(self) -> DetectionRun {
		DetectionRun {
			pattern: self.header.pattern,
			mode: self.header.mode,
			detections: self.detections,
		}
	}
}

/// 检测结果存储（每个 series/pattern 一个文件，重跑整体替换）。
#[derive(Debug, Clone)]
pub struct DetectionStore {
	root: PathBuf,
}

impl DetectionStore {
	/// 打开（不存在则创建）存储根目录。
	pub fn open(root: impl AsRef<Path>) -> std::io::Result<Self> {
		let root = root.as_ref().to_path_buf();
		fs::create_dir_all(&root)?;
		Ok(Self { root })
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	/// run 文件路径。
	pub fn run_path(&self, series_id: &str, pattern: PatternType) -> PathBuf {
		self.series_dir(series_id)
			.join(format!("{}.{RUN_EXT}", pattern.as_str()))
	}

	/// 删除该 series/pattern 的旧检测并写入新的一批，返回写入条数。
	pub fn replace(&self, series_id: &str, run: &DetectionRun) -> std::io::Result<usize> {
		let dir = self.series_dir(series_id);
		fs::create_dir_all(&dir)?;

		let path = self.run_path(series_id, run.pattern);
		let tmp = dir.join(format!("{}.{TMP_EXT}", run.pattern.as_str()));
		let header = RunHeader {
			series_id: series_id.to_string(),
			pattern: run.pattern,
			mode: run.mode,
			written_at: Utc::now(),
			count: run.detections.len(),
		};

		{
			let mut writer = BufWriter::new(File::create(&tmp)?);
			write_line(&mut writer, &header)?;
			for detection in &run.detections {
				write_line(&mut writer, detection)?;
			}
			writer.flush()?;
			writer.get_ref().sync_all()?;
		}
		fs::rename(&tmp, &path)?;

		debug!(
			series = series_id,
			pattern = run.pattern.as_str(),
			mode = run.mode.as_str(),
			count = header.count,
			"detections replaced"
		);
		Ok(header.count)
	}

	/// 读取最近一次写入的 run；从未写过则返回 `None`。
	pub fn load(&self, series_id: &str, pattern: PatternType) -> std::io::Result<Option<StoredRun>> {
		let path = self.run_path(series_id, pattern);
		if !path.exists() {
			return Ok(None);
		}
		let stored = read_run(&path)?;
		if stored.header.series_id != series_id {
			return Err(std::io::Error::new(
				std::io::ErrorKind::InvalidData,
				format!(
					"{} belongs to series {:?}, not {series_id:?}",
					path.display(),
					stored.header.series_id
				),
			));
		}
		Ok(Some(stored))
	}

	/// 删除该 series/pattern 的记录，返回是否存在过。
	pub fn remove(&self, series_id: &str, pattern: PatternType) -> std::io::Result<bool> {
		let path = self.run_path(series_id, pattern);
		if !path.exists() {
			return Ok(false);
		}
		fs::remove_file(&path)?;

		let dir = self.series_dir(series_id);
		if fs::read_dir(&dir)?.next().is_none() {
			fs::remove_dir(&dir)?;
		}
		Ok(true)
	}

	/// 已有记录的 series（取自各 run 文件首行），按字典序。
	pub fn series_ids(&self) -> std::io::Result<Vec<String>> {
		let mut out = Vec::new();
		for entry in fs::read_dir(&self.root)? {
			let dir = entry?.path();
			if !dir.is_dir() {
				continue;
			}
			if let Some(id) = first_series_id(&dir)? {
				out.push(id);
			}
		}
		out.sort();
		out.dedup();
		Ok(out)
	}

	fn series_dir(&self, series_id: &str) -> PathBuf {
		self.root.join(dir_name(series_id))
	}
}

/// 目录名编码：`[A-Za-z0-9_-]` 原样保留，其余字节写成 `%XX`，不同 series 不会落到同一目录。
fn dir_name(series_id: &str) -> String {
	if series_id.is_empty() {
		return "%".to_string();
	}
	let mut name = String::with_capacity(series_id.len());
	for byte in series_id.bytes() {
		if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_') {
			name.push(char::from(byte));
		} else {
			name.push_str(&format!("%{byte:02X}"));
		}
	}
	name
}

fn write_line<T: Serialize>(writer: &mut BufWriter<File>, value: &T) -> std::io::Result<()> {
	serde_json::to_writer(&mut *writer, value).map_err(std::io::Error::other)?;
	writer.write_all(b"\n")
}

fn read_header(line: &str, path: &Path) -> std::io::Result<RunHeader> {
	serde_json::from_str(line).map_err(|error| {
		std::io::Error::new(
			std::io::ErrorKind::InvalidData,
			format!("bad run header in {}: {error}", path.display()),
		)
	})
}

fn read_run(path: &Path) -> std::io::Result<StoredRun> {
	let reader = BufReader::new(File::open(path)?);
	let mut lines = reader.lines();

	let header = match lines.next() {
		Some(line) => read_header(&line?, path)?,
		None => {
			return Err(std::io::Error::new(
				std::io::ErrorKind::InvalidData,
				format!("empty run file {}", path.display()),
			));
		}
	};

	let mut detections = Vec::with_capacity(header.count);
	for line in lines {
		let line = line?;
		if line.trim().is_empty() {
			continue;
		}
		match serde_json::from_str::<Detection>(&line) {
			Ok(detection) => detections.push(detection),
			Err(error) => warn!(path = %path.display(), %error, "skipping bad detection line"),
		}
	}

	Ok(StoredRun { header, detections })
}

fn first_series_id(dir: &Path) -> std::io::Result<Option<String>> {
	for entry in fs::read_dir(dir)? {
		let path = entry?.path();
		let is_run = path
			.file_name()
			.and_then(|x| x.to_str())
			.is_some_and(|x| x.ends_with(RUN_EXT) && !x.ends_with(TMP_EXT));
		if !is_run {
			continue;
		}

		let mut line = String::new();
		BufReader::new(File::open(&path)?).read_line(&mut line)?;
		if let Ok(header) = read_header(line.trim_end(), &path) {
			return Ok(Some(header.series_id));
		}
	}
	Ok(None)
}
