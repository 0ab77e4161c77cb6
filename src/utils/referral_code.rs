/// 根据用户ID与邮箱生成确定性推荐码
///
/// 算法：对 `"{user_id}-{email}"` 的字符码求和，转 36 进制大写，截取前 8 位，
/// 加 `REF` 前缀。码仅作查询键使用，不保证全局唯一（碰撞时取首个匹配）。
pub fn generate_referral_code(user_id: &str, email: &str) -> String {
    let seed = format!("{user_id}-{email}");
    let sum: u64 = seed.chars().map(|c| c as u64).sum();

    let mut base36 = to_base36(sum);
    base36.truncate(8);
    format!("REF{base36}")
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).expect("base36 digits are ASCII")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_referral_code_is_deterministic() {
        let a = generate_referral_code("user-1", "alice@example.com");
        let b = generate_referral_code("user-1", "alice@example.com");
        assert_eq!(a, b);
    }

    #[test]
    fn test_referral_code_shape() {
        let code = generate_referral_code("user-1", "alice@example.com");
        assert!(code.starts_with("REF"));
        assert!(code.len() <= 3 + 8);
        assert!(
            code[3..]
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
        );
    }

    #[test]
    fn test_different_inputs_usually_differ() {
        let a = generate_referral_code("user-1", "alice@example.com");
        let b = generate_referral_code("user-2", "bob@example.com");
        assert_ne!(a, b);
    }

    #[test]
    fn test_to_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "Z");
        assert_eq!(to_base36(36), "10");
    }
}
