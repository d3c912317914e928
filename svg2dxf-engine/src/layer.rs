//! 从分组的 class 列表推导 CAD 图层名。

/// 参与图层名拼接的 class 前缀。
pub const LAYER_PREFIX: &str = "Ifc";
/// 标记剖切角色的 class。
pub const CUT_TOKEN: &str = "cut";
pub const CUT_SUFFIX: &str = "_cut";

/// 按顺序拼接所有 `Ifc*` class（无分隔符），存在 `cut` 时追加一次 `_cut`。
///
/// 不含 `Ifc*` class 时结果可能为空串，由文档落到默认图层。
pub fn resolve<S: AsRef<str>>(class_tokens: &[S]) -> String {
    let mut name: String = class_tokens
        .iter()
        .map(AsRef::as_ref)
        .filter(|token| token.starts_with(LAYER_PREFIX))
        .collect();
    if class_tokens.iter().any(|token| token.as_ref() == CUT_TOKEN) {
        name.push_str(CUT_SUFFIX);
    }
    name
}
