//! nginx reverse-proxy configuration.

use crate::{Config, SiteConfig};

impl SiteConfig {
    /// nginx `server` block proxying `name` to this site.
    ///
    /// Listens on 80 and 443 with Let's Encrypt certificates for `name`.
    #[must_use]
    pub fn to_nginx_config(&self) -> String {
        let name = &self.name;
        let port = self.port;
        format!(
            "server {{
    listen 80;
    listen 443 ssl;
    server_name {name};

    location / {{
        proxy_pass http://localhost:{port}/;
        proxy_set_header Host $http_host;
        proxy_set_header X-Real-IP $remote_addr;
        proxy_set_header X-Forwarded-For $proxy_add_x_forwarded_for;
        server_tokens off;
    }}

    ssl_certificate /etc/letsencrypt/live/{name}/fullchain.pem;
    ssl_certificate_key /etc/letsencrypt/live/{name}/privkey.pem;
    ssl_dhparam /etc/letsencrypt/ssl-dhparams.pem;
    include /etc/letsencrypt/options-ssl-nginx.conf;
}}
"
        )
    }
}

impl Config {
    /// nginx configuration for every site, separated by blank lines.
    #[must_use]
    pub fn to_nginx_config(&self) -> String {
        self.sites
            .iter()
            .map(SiteConfig::to_nginx_config)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
