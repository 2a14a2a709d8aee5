use stockscope_core::store::error::StoreError;

/// 校验表名为普通 SQL 标识符 (`[A-Za-z_][A-Za-z0-9_]*`)，表名会被拼接进 SQL 文本
pub(crate) fn validate_table_name(table: &str) -> Result<(), StoreError> {
    let mut chars = table.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidTableName(table.to_string()))
    }
}

/// 以双引号包裹标识符，内部双引号转义
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_table_name() {
        assert!(validate_table_name("stock_data").is_ok());
        assert!(validate_table_name("_t1").is_ok());
        assert!(validate_table_name("").is_err());
        assert!(validate_table_name("1abc").is_err());
        assert!(validate_table_name("stock_data; DROP TABLE x").is_err());
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("Market_Cap"), "\"Market_Cap\"");
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }
}
