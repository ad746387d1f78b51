//! Handler registry and route resolution
//!
//! Routes are stored as a tree keyed by path segment, with the HTTP method as
//! the last key on the way to a handler leaf:
//!
//! ```text
//! /users        GET   ->  users -> GET -> Leaf
//! /users/admin  POST  ->  users -> admin -> POST -> Leaf
//! ```
//!
//! Matching is exact and case-sensitive. There are no wildcards.

use crate::handler::Handler;
use std::collections::HashMap;
use thiserror::Error;

/// Node of the registry tree
#[derive(Debug, Clone)]
pub enum RouteNode {
    /// Path segments (or method names) to child nodes
    Branch(HashMap<String, RouteNode>),
    /// Terminal handler
    Leaf(Handler),
}

impl Default for RouteNode {
    fn default() -> Self {
        Self::Branch(HashMap::new())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("route {method} {path} conflicts with an existing route at segment '{segment}'")]
    Conflict {
        path: String,
        method: String,
        segment: String,
    },
}

/// Tree of API handlers, installed once and read-only while serving
#[derive(Debug, Clone, Default)]
pub struct Registry {
    root: RouteNode,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a tree built elsewhere
    pub const fn from_root(root: RouteNode) -> Self {
        Self { root }
    }

    /// Register `handler` for `path` and `method`
    ///
    /// Registering the same path and method twice replaces the earlier handler.
    pub fn insert(
        &mut self,
        path: &str,
        method: &str,
        handler: Handler,
    ) -> Result<(), RegistryError> {
        let segments = route_segments(path, method);
        let conflict = |segment: &str| RegistryError::Conflict {
            path: path.to_string(),
            method: method.to_string(),
            segment: segment.to_string(),
        };

        let Some((last, parents)) = segments.split_last() else {
            return Ok(());
        };

        let mut node = &mut self.root;
        for segment in parents {
            let RouteNode::Branch(children) = node else {
                return Err(conflict(segment));
            };
            let child = children.entry((*segment).to_string()).or_default();
            if matches!(child, RouteNode::Leaf(_)) {
                return Err(conflict(segment));
            }
            node = child;
        }

        let RouteNode::Branch(children) = node else {
            return Err(conflict(last));
        };
        if let Some(RouteNode::Branch(_)) = children.get(*last) {
            return Err(conflict(last));
        }
        children.insert((*last).to_string(), RouteNode::Leaf(handler));
        Ok(())
    }

    /// Find the handler registered for `path` and `method`
    pub fn resolve(&self, path: &str, method: &str) -> Option<&Handler> {
        let mut node = &self.root;
        for segment in route_segments(path, method) {
            let RouteNode::Branch(children) = node else {
                return None;
            };
            node = children.get(segment)?;
        }

        match node {
            RouteNode::Leaf(handler) => Some(handler),
            RouteNode::Branch(_) => None,
        }
    }
}

/// Split a URL path into route segments and append the method
///
/// Leading and trailing slashes are dropped; empty segments in between are kept.
pub fn route_segments<'a>(path: &'a str, method: &'a str) -> Vec<&'a str> {
    let trimmed = path.trim_matches('/');
    let mut segments: Vec<&str> = if trimmed.is_empty() {
        Vec::new()
    } else {
        trimmed.split('/').collect()
    };
    segments.push(method);
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo() -> Handler {
        Handler::buffered(|_, body| body.to_string())
    }

    fn registry_with(routes: &[(&str, &str)]) -> Registry {
        let mut registry = Registry::new();
        for (path, method) in routes {
            registry.insert(path, method, echo()).expect("insert route");
        }
        registry
    }

    #[test]
    fn test_route_segments() {
        assert_eq!(route_segments("/a/b", "GET"), vec!["a", "b", "GET"]);
        assert_eq!(route_segments("/a/b/", "GET"), vec!["a", "b", "GET"]);
        assert_eq!(route_segments("/", "POST"), vec!["POST"]);
        assert_eq!(route_segments("", "GET"), vec!["GET"]);
        assert_eq!(route_segments("/a//b", "GET"), vec!["a", "", "b", "GET"]);
    }

    #[test]
    fn test_exact_match() {
        let registry = registry_with(&[("/a/b", "GET")]);
        assert!(registry.resolve("/a/b", "GET").is_some());
        assert!(registry.resolve("a/b", "GET").is_some());
    }

    #[test]
    fn test_method_and_prefix_do_not_match() {
        let registry = registry_with(&[("/a/b", "GET")]);
        assert!(registry.resolve("/a/b", "POST").is_none());
        assert!(registry.resolve("/a", "GET").is_none());
        assert!(registry.resolve("/a/b/c", "GET").is_none());
        assert!(registry.resolve("/", "GET").is_none());
    }

    #[test]
    fn test_case_sensitive() {
        let registry = registry_with(&[("/Users", "GET")]);
        assert!(registry.resolve("/users", "GET").is_none());
        assert!(registry.resolve("/Users", "get").is_none());
        assert!(registry.resolve("/Users", "GET").is_some());
    }

    #[test]
    fn test_nested_routes_coexist() {
        let registry = registry_with(&[("/a", "GET"), ("/a/b", "GET"), ("/a/b", "POST")]);
        assert!(registry.resolve("/a", "GET").is_some());
        assert!(registry.resolve("/a/b", "GET").is_some());
        assert!(registry.resolve("/a/b", "POST").is_some());
        assert!(registry.resolve("/a", "POST").is_none());
    }

    #[test]
    fn test_root_route() {
        let registry = registry_with(&[("/", "GET")]);
        assert!(registry.resolve("/", "GET").is_some());
        assert!(registry.resolve("/x", "GET").is_none());
    }

    #[test]
    fn test_empty_registry_resolves_nothing() {
        let registry = Registry::new();
        assert!(registry.resolve("/", "GET").is_none());
        assert!(registry.resolve("/a/b", "POST").is_none());
    }

    #[test]
    fn test_reinsert_replaces_handler() {
        let mut registry = Registry::new();
        registry.insert("/h", "GET", echo()).unwrap();
        let streaming = Handler::streaming(|_req| async {
            hyper::Response::new(crate::http::response::full_body(""))
        });
        registry.insert("/h", "GET", streaming).unwrap();
        assert!(registry.resolve("/h", "GET").unwrap().is_streaming());
    }

    #[test]
    fn test_conflicting_insert() {
        let mut registry = registry_with(&[("/a", "GET")]);
        // "GET" is a leaf under "a"; it cannot also be a branch
        let err = registry.insert("/a/GET", "POST", echo()).unwrap_err();
        assert_eq!(
            err,
            RegistryError::Conflict {
                path: "/a/GET".to_string(),
                method: "POST".to_string(),
                segment: "GET".to_string(),
            }
        );

        // A branch at "x" cannot be replaced by a leaf
        let mut registry = registry_with(&[("/x/y", "GET")]);
        assert!(registry.insert("/", "x", echo()).is_err());
    }

    #[test]
    fn test_from_root_tree() {
        let mut methods = HashMap::new();
        methods.insert("GET".to_string(), RouteNode::Leaf(echo()));
        let mut root = HashMap::new();
        root.insert("status".to_string(), RouteNode::Branch(methods));

        let registry = Registry::from_root(RouteNode::Branch(root));
        assert!(registry.resolve("/status", "GET").is_some());
        assert!(registry.resolve("/status", "HEAD").is_none());
    }

    #[test]
    fn test_leaf_root_never_matches() {
        let registry = Registry::from_root(RouteNode::Leaf(echo()));
        assert!(registry.resolve("/", "GET").is_none());
    }
}
