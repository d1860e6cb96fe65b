//! Utility functions shared by the mvcx crates
//!
//! Naming helpers used when deriving service names and route segments
//! from Rust type names.

/// Naming convention utilities
pub mod naming {
    /// Converts a PascalCase type name to camelCase for service naming.
    ///
    /// `UserService` becomes `userService`.
    ///
    /// # Examples
    ///
    /// ```
    /// use mvcx_core::utils::naming::to_camel_case;
    ///
    /// assert_eq!(to_camel_case("UserService"), "userService");
    /// assert_eq!(to_camel_case("A"), "a");
    /// assert_eq!(to_camel_case(""), "");
    /// ```
    pub fn to_camel_case(s: &str) -> String {
        let mut chars = s.chars();
        match chars.next() {
            None => String::new(),
            Some(first) => {
                let mut result = String::with_capacity(s.len());
                result.extend(first.to_lowercase());
                result.push_str(chars.as_str());
                result
            }
        }
    }

    /// Returns the last path segment of a type name.
    ///
    /// Generic arguments are kept as-is; only the leading module path is
    /// removed.
    ///
    /// ```
    /// use mvcx_core::utils::naming::short_type_name;
    ///
    /// assert_eq!(short_type_name("app::web::ProductsController"), "ProductsController");
    /// assert_eq!(short_type_name("ProductsController"), "ProductsController");
    /// ```
    pub fn short_type_name(type_name: &str) -> &str {
        let base = type_name.split('<').next().unwrap_or(type_name);
        match base.rfind("::") {
            Some(idx) => &type_name[idx + 2..],
            None => type_name,
        }
    }

    /// Joins the segments with `separator` and lowercases the result.
    ///
    /// ```
    /// use mvcx_core::utils::naming::join_lowercase;
    ///
    /// assert_eq!(join_lowercase(&["Admin", "Products", "new"], "-"), "admin-products-new");
    /// ```
    pub fn join_lowercase<S: AsRef<str>>(segments: &[S], separator: &str) -> String {
        segments
            .iter()
            .map(|segment| segment.as_ref())
            .collect::<Vec<_>>()
            .join(separator)
            .to_lowercase()
    }
}
