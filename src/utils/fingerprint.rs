/// IP + User-Agent 的 md5 摘要，作为弱反作弊设备指纹
pub fn device_fingerprint(ip: &str, user_agent: &str) -> String {
    format!("{:x}", md5::compute(format!("{ip}|{user_agent}")))
}
