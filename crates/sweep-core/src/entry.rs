use crate::DeletionTask;

/// A single directory listing entry as handed over by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    pub name: String,
    pub is_dir: bool,
}

impl DirEntryInfo {
    pub fn file(name: impl Into<String>) -> Self {
        DirEntryInfo {
            name: name.into(),
            is_dir: false,
        }
    }

    pub fn dir(name: impl Into<String>) -> Self {
        DirEntryInfo {
            name: name.into(),
            is_dir: true,
        }
    }
}

/// Build one fresh task per non-directory entry whose name ends with `extension`.
///
/// Listing order is preserved. An empty extension matches every file.
pub fn matching_tasks(entries: &[DirEntryInfo], extension: &str) -> Vec<DeletionTask> {
    entries
        .iter()
        .filter(|entry| !entry.is_dir && entry.name.ends_with(extension))
        .map(|entry| DeletionTask::new(entry.name.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_filters_by_extension() {
        let entries = vec![
            DirEntryInfo::file("a.rdp"),
            DirEntryInfo::file("b.rdp"),
            DirEntryInfo::file("c.txt"),
        ];

        let tasks = matching_tasks(&entries, ".rdp");
        let names: Vec<_> = tasks.iter().map(|t| t.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.rdp", "b.rdp"]);
        assert!(tasks.iter().all(|t| t.retry_count == 0));
    }

    #[test]
    fn test_skips_directories() {
        let entries = vec![DirEntryInfo::dir("nested.rdp"), DirEntryInfo::file("x.rdp")];

        let tasks = matching_tasks(&entries, ".rdp");
        assert_eq!(tasks, vec![DeletionTask::new("x.rdp")]);
    }

    #[test]
    fn test_suffix_is_case_sensitive() {
        let entries = vec![DirEntryInfo::file("A.RDP"), DirEntryInfo::file("a.rdp.bak")];
        assert!(matching_tasks(&entries, ".rdp").is_empty());
    }

    #[test]
    fn test_no_matches() {
        let entries = vec![DirEntryInfo::file("notes.txt")];
        assert!(matching_tasks(&entries, ".rdp").is_empty());
        assert!(matching_tasks(&[], ".rdp").is_empty());
    }

    proptest! {
        #[test]
        fn prop_only_matching_files_are_enqueued(
            raw in proptest::collection::vec(("[a-z]{1,8}", prop_oneof![Just(".rdp"), Just(".txt"), Just("")], any::<bool>()), 0..40)
        ) {
            let entries: Vec<DirEntryInfo> = raw
                .iter()
                .map(|(stem, ext, is_dir)| DirEntryInfo { name: format!("{stem}{ext}"), is_dir: *is_dir })
                .collect();

            let tasks = matching_tasks(&entries, ".rdp");
            let expected = entries.iter().filter(|e| !e.is_dir && e.name.ends_with(".rdp")).count();

            prop_assert_eq!(tasks.len(), expected);
            for task in &tasks {
                prop_assert!(task.file_name.ends_with(".rdp"));
                prop_assert!(entries.iter().any(|e| !e.is_dir && e.name == task.file_name));
            }
        }
    }
}
