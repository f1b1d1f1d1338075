// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 消息模板替换
//!
//! 模板只支持 `{name}` 形式的命名占位符，没有条件逻辑。
//! 没有对应数据的占位符替换为空字符串。

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("Failed to compile placeholder regex")
});

/// 用给定变量渲染模板
///
/// 单次扫描完成替换，变量值中出现的花括号不会被再次解析
///
/// # 参数
///
/// * `template` - 模板字符串
/// * `vars` - 占位符名称与取值
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            let name = &caps[1];
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.to_string())
                .unwrap_or_default()
        })
        .into_owned()
}
