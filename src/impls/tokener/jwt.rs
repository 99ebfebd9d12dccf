use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::core::ports::tokener::{Payload, Tokener};
use crate::error::Error;

pub struct JWT {
    secret: Vec<u8>,
}

impl JWT {
    pub fn new(secret: Vec<u8>) -> Self {
        Self { secret }
    }
}

impl<P> Tokener<P> for JWT
where
    P: Payload,
{
    fn gen_token(&self, payload: &P) -> Result<String, Error> {
        let header = Header::new(Algorithm::HS256);
        let key = EncodingKey::from_secret(&self.secret);
        let token = encode(&header, payload, &key)?;
        Ok(token)
    }
    fn verify_token(&self, token: &str) -> Result<P, Error> {
        let key = DecodingKey::from_secret(&self.secret);
        let validation = Validation::new(Algorithm::HS256);
        let payload = decode(token, &key, &validation)?;
        Ok(payload.claims)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::models::user::Claim;
    use chrono::{Duration, Utc};

    fn claim(user: &str, exp: i64) -> Claim {
        Claim { user: user.into(), exp }
    }

    #[test]
    fn test_gen_and_verify_token() {
        let jwt = JWT::new(vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 0]);
        let c = claim("42", (Utc::now() + Duration::days(1)).timestamp());
        let token = jwt.gen_token(&c).unwrap();
        let verified: Claim = jwt.verify_token(&token).unwrap();
        assert_eq!(verified.user, "42");
    }

    #[test]
    fn test_expired_token_rejected() {
        let jwt = JWT::new(vec![1, 2, 3]);
        let token = jwt.gen_token(&claim("42", (Utc::now() - Duration::days(1)).timestamp())).unwrap();
        assert!(matches!(<JWT as Tokener<Claim>>::verify_token(&jwt, &token), Err(Error::JWTError(_))));
    }

    #[test]
    fn test_foreign_secret_rejected() {
        let ours = JWT::new(b"ours".to_vec());
        let theirs = JWT::new(b"theirs".to_vec());
        let token = theirs.gen_token(&claim("1", (Utc::now() + Duration::days(1)).timestamp())).unwrap();
        assert!(<JWT as Tokener<Claim>>::verify_token(&ours, &token).is_err());
    }
}
