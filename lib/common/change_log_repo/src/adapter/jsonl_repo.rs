use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use asset_diff::{ChangeVector, Iri};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::mem_repo::MemChangeLogRepo;
use crate::{ChangeLogRepo, RepoError};

/// 日志文件中的一行：一个完整批次
#[derive(Serialize)]
struct BatchLine<'a> {
    vectors: &'a [ChangeVector],
}

#[derive(Deserialize)]
struct OwnedBatchLine {
    vectors: Vec<ChangeVector>,
}

/// 基于 JSON Lines 文件的变更日志仓储
///
/// 每个批次序列化为一行并在返回前 `sync_data`，一行即一个原子单元。
/// 打开时回放整个文件建立内存索引，查询只读内存。
///
/// 崩溃恢复：
/// - 末尾没有换行且无法解析的行视为未写完的批次，截断并记录警告
/// - 中间行无法解析返回 `RepoError::Corrupted`
///
/// # 示例
/// ```ignore
/// let repo = JsonlChangeLogRepo::open("data/change-log.jsonl")?;
/// repo.append(&batch)?;
/// ```
#[derive(Debug)]
pub struct JsonlChangeLogRepo {
    path: PathBuf,
    file: Mutex<File>,
    index: MemChangeLogRepo,
}

impl JsonlChangeLogRepo {
    /// 打开（不存在则创建）日志文件并回放已有批次
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RepoError> {
        let path = path.as_ref().to_path_buf();
        let mut file =
            OpenOptions::new().read(true).append(true).create(true).open(&path)?;

        let mut content = Vec::new();
        file.read_to_end(&mut content)?;

        let index = MemChangeLogRepo::new();
        let mut offset = 0usize;
        let mut batches = 0usize;
        let mut needs_newline = false;

        // 按字节切分：截断在多字节字符中间的尾行不是合法 UTF-8
        for (line_no, chunk) in content.split_inclusive(|b| *b == b'\n').enumerate() {
            let complete = chunk.last() == Some(&b'\n');
            let text = chunk.trim_ascii_end();
            if !text.is_empty() {
                match serde_json::from_slice::<OwnedBatchLine>(text) {
                    Ok(batch) => {
                        index.push_batch(batch.vectors);
                        batches += 1;
                        needs_newline = !complete;
                    }
                    Err(err) if !complete => {
                        tracing::warn!(
                            path = %path.display(),
                            line = line_no + 1,
                            error = %err,
                            "discarding incomplete trailing batch"
                        );
                        file.set_len(offset as u64)?;
                        break;
                    }
                    Err(err) => {
                        return Err(RepoError::Corrupted {
                            line: line_no + 1,
                            reason: err.to_string(),
                        })
                    }
                }
            }
            offset += chunk.len();
        }

        if needs_newline {
            file.write_all(b"\n")?;
            file.sync_data()?;
        }

        tracing::info!(path = %path.display(), batches, "change log opened");

        Ok(Self { path, file: Mutex::new(file), index })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ChangeLogRepo for JsonlChangeLogRepo {
    fn append(&self, batch: &[ChangeVector]) -> Result<(), RepoError> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut line = serde_json::to_vec(&BatchLine { vectors: batch })?;
        line.push(b'\n');

        // 持有文件锁直到索引更新完成，索引顺序与文件顺序一致
        let mut file = self.file.lock();
        let len_before = file.metadata()?.len();
        if let Err(err) = file.write_all(&line).and_then(|_| file.sync_data()) {
            if let Err(rollback) = file.set_len(len_before) {
                tracing::error!(
                    path = %self.path.display(),
                    error = %rollback,
                    "failed to roll back partial batch"
                );
            }
            return Err(RepoError::Io(err));
        }
        self.index.push_batch(batch.to_vec());
        Ok(())
    }

    fn find_all_for_entity(
        &self,
        entity_type: &str,
        entity_id: &Iri,
    ) -> Result<Vec<ChangeVector>, RepoError> {
        self.index.find_all_for_entity(entity_type, entity_id)
    }

    fn find_changes_of_type_since(
        &self,
        since: DateTime<Utc>,
        entity_type: &str,
    ) -> Result<Vec<ChangeVector>, RepoError> {
        self.index.find_changes_of_type_since(since, entity_type)
    }

    fn count(&self) -> Result<u64, RepoError> {
        self.index.count()
    }
}
