//! Ordered filesystem-type candidates for the mount fallback chain.
//!
//! Disc images come in several on-disk formats and the quickest way to find
//! the right driver is to let the kernel try them in order. Each candidate
//! optionally names the kernel module that backs it; the module is loaded
//! best-effort before the attempt.

/// One entry in the fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FsCandidate {
    /// Filesystem type passed to the mount call.
    pub fstype: &'static str,

    /// Kernel module backing this type, if one exists.
    pub module: Option<&'static str>,
}

/// Candidates in attempt order, most common first, `auto` as the last
/// resort. Entries without a module rely on drivers already present.
pub const FS_CANDIDATES: &[FsCandidate] = &[
    FsCandidate {
        fstype: "iso9660",
        module: Some("isofs"),
    },
    FsCandidate {
        fstype: "udf",
        module: Some("udf"),
    },
    FsCandidate {
        fstype: "hfsplus",
        module: Some("hfsplus"),
    },
    FsCandidate {
        fstype: "rockridge",
        module: None,
    },
    FsCandidate {
        fstype: "joliet",
        module: None,
    },
    FsCandidate {
        fstype: "isofs",
        module: Some("isofs"),
    },
    FsCandidate {
        fstype: "auto",
        module: None,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_order() {
        let types: Vec<&str> = FS_CANDIDATES.iter().map(|c| c.fstype).collect();
        assert_eq!(
            types,
            vec!["iso9660", "udf", "hfsplus", "rockridge", "joliet", "isofs", "auto"]
        );
    }

    #[test]
    fn test_auto_is_last_resort() {
        assert_eq!(FS_CANDIDATES.last().map(|c| c.fstype), Some("auto"));
        assert_eq!(FS_CANDIDATES.last().and_then(|c| c.module), None);
    }

    #[test]
    fn test_module_mapping() {
        let module_of = |fstype: &str| {
            FS_CANDIDATES
                .iter()
                .find(|c| c.fstype == fstype)
                .and_then(|c| c.module)
        };
        assert_eq!(module_of("iso9660"), Some("isofs"));
        assert_eq!(module_of("udf"), Some("udf"));
        assert_eq!(module_of("hfsplus"), Some("hfsplus"));
        assert_eq!(module_of("isofs"), Some("isofs"));
        assert_eq!(module_of("rockridge"), None);
        assert_eq!(module_of("joliet"), None);
    }
}
