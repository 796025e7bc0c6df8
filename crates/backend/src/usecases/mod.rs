pub mod u100_sales_forecast;
