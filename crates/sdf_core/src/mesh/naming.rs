//! Deterministic mesh display names.

/// Extensions stripped from the end of a mesh file name, matched case-insensitively.
pub const KNOWN_MESH_EXTENSIONS: [&str; 4] = ["dae", "stl", "obj", "fbx"];

/// Derive a display name from a mesh URI.
///
/// Takes the final path segment, strips one trailing known mesh extension
/// and replaces the remaining dots with underscores:
/// `model://plant/meshes/stem.dae` -> `stem`, `pot.v2.stl` -> `pot_v2`.
///
/// The result is used as the key for resolved content, so it depends on the
/// URI string alone.
pub fn mesh_display_name(uri: &str) -> String {
    let file_name = uri.rsplit(['/', '\\']).next().unwrap_or(uri);

    let stem = match file_name.rsplit_once('.') {
        Some((stem, ext))
            if KNOWN_MESH_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known)) =>
        {
            stem
        }
        _ => file_name,
    };

    stem.replace('.', "_")
}

/// Lowercased extension of a path or URI, if it has one.
pub fn extension_of(path: &str) -> Option<String> {
    let file_name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_uri() {
        assert_eq!(mesh_display_name("model://plant/meshes/stem.dae"), "stem");
    }

    #[test]
    fn test_remaining_dots_become_underscores() {
        assert_eq!(mesh_display_name("meshes/pot.v2.stl"), "pot_v2");
        assert_eq!(mesh_display_name("leaf.tar.gz"), "leaf_tar_gz");
    }

    #[test]
    fn test_extension_case_insensitive() {
        assert_eq!(mesh_display_name("file:///tmp/Root.DAE"), "Root");
        assert_eq!(mesh_display_name("C:\\meshes\\flower.OBJ"), "flower");
    }

    #[test]
    fn test_no_extension() {
        assert_eq!(mesh_display_name("meshes/bare"), "bare");
        assert_eq!(mesh_display_name(""), "");
    }

    #[test]
    fn test_is_deterministic() {
        let uri = "model://plant/meshes/stem.dae";
        assert_eq!(mesh_display_name(uri), mesh_display_name(uri));
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("/a/b/stem.DAE").as_deref(), Some("dae"));
        assert_eq!(extension_of("/a.dir/stem"), None);
    }
}
