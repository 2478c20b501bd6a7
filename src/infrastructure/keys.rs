/// 发布流程用到的按键
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    End,
    Enter,
}

/// CDP `Input.dispatchKeyEvent` 需要的按键描述
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyDefinition {
    pub key: &'static str,
    pub code: &'static str,
    pub key_code: i64,
    /// 会产生输入字符的按键
    pub text: Option<&'static str>,
}

impl Key {
    pub fn definition(self) -> KeyDefinition {
        match self {
            Key::End => KeyDefinition {
                key: "End",
                code: "End",
                key_code: 35,
                text: None,
            },
            Key::Enter => KeyDefinition {
                key: "Enter",
                code: "Enter",
                key_code: 13,
                text: Some("\r"),
            },
        }
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.definition().key)
    }
}
