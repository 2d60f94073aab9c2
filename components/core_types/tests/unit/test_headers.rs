//! Unit tests for the Headers multimap

use core_types::Headers;

#[cfg(test)]
mod access_tests {
    use super::*;

    #[test]
    fn test_empty_headers() {
        let headers = Headers::new();
        assert!(headers.is_empty());
        assert_eq!(headers.len(), 0);
    }

    #[test]
    fn test_from_pairs_preserves_duplicates() {
        let headers = Headers::from_pairs([("A", "1"), ("A", "2"), ("B", "3")]);
        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get_all("A").unwrap().len(), 2);
    }

    #[test]
    fn test_names_are_compared_verbatim() {
        let mut headers = Headers::new();
        headers.set("Content-Type", "text/html");
        assert!(headers.has("Content-Type"));
        assert!(!headers.has("content-type"));
    }

    #[test]
    fn test_iter_yields_every_entry() {
        let headers = Headers::from_pairs([("A", "1"), ("B", "2")]);
        let mut names: Vec<&str> = headers.iter().map(|(name, _)| name).collect();
        names.sort_unstable();
        assert_eq!(names, vec!["A", "B"]);
    }
}

#[cfg(test)]
mod mutation_tests {
    use super::*;

    #[test]
    fn test_delete_unknown_name_is_noop() {
        let mut headers = Headers::new();
        headers.delete("X-Missing");
        assert!(headers.is_empty());
    }

    #[test]
    fn test_set_after_append_collapses_to_one_value() {
        let mut headers = Headers::new();
        headers.append("A", "1");
        headers.append("A", "2");
        headers.set("A", "3");
        assert_eq!(headers.get_all("A").unwrap(), &["3".to_string()]);
    }
}
