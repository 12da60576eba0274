//! Relative-to-absolute playlist rewriting.

/// Rewrites a playlist's relative media references against the manifest's
/// own location so the text stays valid when served from another origin.
///
/// Directives (`#` lines), blank lines, and already-absolute lines pass
/// through unchanged, which makes the rewrite idempotent. Pure function; no
/// network access.
pub fn rewrite(manifest: &str, manifest_url: &str) -> String {
    let base = match manifest_url.rfind('/') {
        Some(index) => &manifest_url[..=index],
        None => manifest_url,
    };

    let mut rewritten: String = manifest
        .lines()
        .map(|line| {
            let trimmed = line.trim();
            if trimmed.is_empty()
                || trimmed.starts_with('#')
                || trimmed.starts_with("http://")
                || trimmed.starts_with("https://")
            {
                line.to_string()
            } else {
                format!("{base}{trimmed}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    if manifest.ends_with('\n') {
        rewritten.push('\n');
    }

    rewritten
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrites_relative_lines_only() {
        let manifest = "seg1.ts\n#EXTINF:1\nhttp://x/seg2.ts\n";
        let rewritten = rewrite(manifest, "http://cdn/path/master.m3u8");
        assert_eq!(rewritten, "http://cdn/path/seg1.ts\n#EXTINF:1\nhttp://x/seg2.ts\n");
    }

    #[test]
    fn test_preserves_directives_and_blank_lines() {
        let manifest = "#EXTM3U\n#EXT-X-TARGETDURATION:10\n\nchunk-0.ts\n";
        let rewritten = rewrite(manifest, "https://cdn.example.net/vod/abc/index.m3u8");
        assert_eq!(
            rewritten,
            "#EXTM3U\n#EXT-X-TARGETDURATION:10\n\nhttps://cdn.example.net/vod/abc/chunk-0.ts\n"
        );
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let manifest = "#EXTM3U\nseg1.ts\nsub/seg2.ts\nhttps://other/seg3.ts\n";
        let once = rewrite(manifest, "https://cdn/path/deep/master.m3u8");
        let twice = rewrite(&once, "https://cdn/path/deep/master.m3u8");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_no_trailing_newline_preserved() {
        let rewritten = rewrite("seg1.ts", "http://cdn/a/master.m3u8");
        assert_eq!(rewritten, "http://cdn/a/seg1.ts");
    }
}
